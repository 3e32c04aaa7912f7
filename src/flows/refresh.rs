//! The refresh-token grant (`grant_type=refresh_token`).

use crate::account::Account;
use crate::error::{OidcError, Result};
use crate::http::HttpTransport;
use crate::secret::Secret;

use super::{encode_param, exchange, resolve_scope};

/// Precondition: a non-empty refresh token. Returns [`OidcError::NoRefreshToken`] (a skip, not a
/// hard failure) if none is stored.
///
/// Failure semantics: an issuer-reported `invalid_grant` means the refresh token is revoked --
/// this returns [`OidcError::Revoked`] and clears the stored refresh token so subsequent attempts
/// in a later call skip this flow instead of retrying a token the issuer has already rejected.
pub async fn run(
    account: &mut Account,
    transport: &dyn HttpTransport,
    scope_override: Option<&str>,
) -> Result<String> {
    if !account.tokens.refresh_token_present() {
        return Err(OidcError::NoRefreshToken);
    }

    let refresh_token = account.tokens.refresh_token.expose().to_owned();
    let mut body = format!(
        "grant_type=refresh_token&{}",
        encode_param("refresh_token", &refresh_token)
    );
    if let Some(scope) = resolve_scope(account, scope_override) {
        body.push('&');
        body.push_str(&encode_param("scope", &scope));
    }

    match exchange(account, transport, &body).await {
        Ok(token) => Ok(token),
        Err(OidcError::Oidc { error, description }) if error == "invalid_grant" => {
            account.tokens.refresh_token = Secret::empty();
            Err(OidcError::Revoked(description))
        }
        Err(other) => Err(other),
    }
}
