//! Flow drivers: four peers, one per OAuth grant type, each encoding
//! "build request -> POST to token endpoint -> hand body to parser -> update account".
//!
//! All four share a common post-condition: on success they mutate the account's cached tokens via
//! [`crate::token_response::apply_token_response`] and return the new access token; on failure
//! they return a typed error and leave cached state unchanged.

pub mod code;
pub mod device;
pub mod password;
pub mod refresh;

use tracing::debug;

use crate::account::Account;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::token_response::apply_token_response;

/// Build the `client_secret_basic` header pair for this account, or `None` for a public client
/// (`client_secret_basic: none`).
fn basic_auth(account: &Account) -> Option<(&str, Option<&str>)> {
    account
        .client
        .client_secret
        .as_ref()
        .map(|secret| (account.client.client_id.as_str(), Some(secret.expose())))
}

/// The token endpoint for `account`. Callers (the flow drivers) are only ever invoked after the
/// orchestrator has ensured discovery has run, so this is infallible in practice, but we still
/// surface a typed error rather than panicking if a caller drives a flow directly without going
/// through the orchestrator.
fn token_endpoint(account: &Account) -> Result<&str> {
    account
        .issuer_metadata
        .as_ref()
        .map(|m| m.token_endpoint.as_str())
        .ok_or_else(|| {
            crate::error::OidcError::Other(
                "account has no issuer metadata; discovery must run before any flow".into(),
            )
        })
}

/// Resolve the scope to send with a token request: the caller's override, else the account's
/// configured scopes, else nothing.
fn resolve_scope<'a>(account: &'a Account, scope_override: Option<&'a str>) -> Option<String> {
    if let Some(scope) = scope_override {
        return Some(scope.to_owned());
    }
    if account.scopes.is_empty() {
        None
    } else {
        Some(account.scopes.join(" "))
    }
}

/// POST `params` (url-encoded by the caller) to the token endpoint and apply the parsed response
/// to `account`.
async fn exchange(
    account: &mut Account,
    transport: &dyn HttpTransport,
    body: &str,
) -> Result<String> {
    let url = token_endpoint(account)?.to_owned();
    let trust_anchor = account.trust_anchor_path.clone();
    let auth = basic_auth(account).map(|(id, secret)| (id.to_owned(), secret.map(str::to_owned)));

    // A public client (no client_secret, so no Authorization: Basic header) must still identify
    // itself with a client_id body parameter, per RFC 6749's client_secret_basic/none split.
    let body = if auth.is_none() {
        format!("{body}&{}", encode_param("client_id", &account.client.client_id))
    } else {
        body.to_owned()
    };

    debug!(account = %account.name, %url, "token request built");
    let post_result = transport
        .post_form(
            &url,
            &body,
            trust_anchor.as_deref(),
            auth.as_ref()
                .map(|(id, secret)| (id.as_str(), secret.as_deref())),
        )
        .await;

    let response = match post_result {
        Ok(body) => body,
        // Issuers report OAuth errors (including `invalid_grant`) as a structured JSON body
        // alongside a non-2xx status. Try to recover that structure before giving up; if the
        // body isn't a recognisable OAuth error object, surface the original transport failure.
        Err(crate::error::OidcError::HttpStatus { body, .. }) => body.into_bytes(),
        Err(other) => return Err(other),
    };
    debug!(account = %account.name, bytes = response.len(), "token response received");

    apply_token_response(account, &response)
}

/// URL-encode a single `key=value` form parameter.
fn encode_param(key: &str, value: &str) -> String {
    format!("{key}={}", url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>())
}
