//! Decodes an issuer's JSON token response and mutates the account's cached tokens accordingly.

use serde::Deserialize;

use crate::account::{now, Account};
use crate::error::{OidcError, Result};
use crate::secret::Secret;

#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: Option<serde_json::Value>,
    refresh_token: Option<String>,
    scope: Option<String>,
    id_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    #[allow(dead_code)]
    error_uri: Option<String>,
}

/// Parse an issuer's token-endpoint JSON body and apply it to `account`. On success, returns the
/// new access token (already stored on `account.tokens.access_token`). On an OAuth error object,
/// `account` is left unmutated and the error is returned.
pub fn apply_token_response(account: &mut Account, body: &[u8]) -> Result<String> {
    let parsed: RawTokenResponse = serde_json::from_slice(body)
        .map_err(|e| OidcError::MalformedResponse(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(OidcError::Oidc {
            error,
            description: parsed
                .error_description
                .unwrap_or_else(|| "no error_description provided by issuer".to_owned()),
        });
    }

    let access_token = parsed
        .access_token
        .ok_or_else(|| OidcError::MalformedResponse("response has no access_token".into()))?;

    account.tokens.access_token = Secret::new(access_token.clone());
    account.tokens.expires_at = match parsed.expires_in.as_ref().and_then(positive_seconds) {
        Some(seconds) => now() + seconds,
        None => 0,
    };

    if let Some(refresh_token) = parsed.refresh_token {
        account.tokens.refresh_token = Secret::new(refresh_token);
    }
    // If the issuer omitted refresh_token, the previous one is retained unchanged -- refresh
    // token rotation is opt-in by the server.

    if let Some(id_token) = parsed.id_token {
        account.tokens.id_token = Secret::new(id_token);
    }

    if let Some(scope) = parsed.scope {
        account.tokens.scope = Some(scope);
    }

    let _ = parsed.token_type;
    Ok(access_token)
}

/// `expires_in` must be a positive integer to be usable; anything else (zero, negative, a string,
/// a float) means "unknown, treat as expired for freshness checks".
fn positive_seconds(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().filter(|seconds| *seconds > 0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::account::Account;
    use serde_json::json;

    fn fresh_account() -> Account {
        Account::new("test", "https://issuer.example", "client")
    }

    #[test]
    fn test_success_sets_expiry_from_expires_in() {
        let mut account = fresh_account();
        let body = json!({
            "access_token": "AT1",
            "expires_in": 3600,
            "refresh_token": "RT1",
        });
        let token = apply_token_response(&mut account, body.to_string().as_bytes()).unwrap();
        assert_eq!(token, "AT1");
        assert_eq!(account.tokens.access_token.expose(), "AT1");
        assert_eq!(account.tokens.refresh_token.expose(), "RT1");
        assert!(account.tokens.expires_at > now());
    }

    #[test]
    fn test_missing_expires_in_means_unknown_expiry() {
        let mut account = fresh_account();
        let body = json!({ "access_token": "AT1" });
        apply_token_response(&mut account, body.to_string().as_bytes()).unwrap();
        assert_eq!(account.tokens.expires_at, 0);
        assert!(!account.tokens.access_token_present(now()));
    }

    #[test]
    fn test_missing_refresh_token_retains_previous() {
        let mut account = fresh_account();
        account.tokens.refresh_token = Secret::new("OLD_RT");
        let body = json!({ "access_token": "AT1", "expires_in": 60 });
        apply_token_response(&mut account, body.to_string().as_bytes()).unwrap();
        assert_eq!(account.tokens.refresh_token.expose(), "OLD_RT");
    }

    #[test]
    fn test_oauth_error_does_not_mutate_account() {
        let mut account = fresh_account();
        account.tokens.access_token = Secret::new("UNCHANGED");
        let body = json!({ "error": "invalid_grant", "error_description": "token revoked" });
        let err = apply_token_response(&mut account, body.to_string().as_bytes()).unwrap_err();
        match err {
            OidcError::Oidc { error, description } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description, "token revoked");
            }
            other => panic!("expected Oidc error, got {other:?}"),
        }
        assert_eq!(account.tokens.access_token.expose(), "UNCHANGED");
    }

    #[test]
    fn test_malformed_json() {
        let mut account = fresh_account();
        let err = apply_token_response(&mut account, b"not json").unwrap_err();
        assert!(matches!(err, OidcError::MalformedResponse(_)));
    }

    #[test]
    fn test_scope_replaces_previous() {
        let mut account = fresh_account();
        account.tokens.scope = Some("old:scope".into());
        let body = json!({ "access_token": "AT1", "expires_in": 60, "scope": "new:scope" });
        apply_token_response(&mut account, body.to_string().as_bytes()).unwrap();
        assert_eq!(account.tokens.scope.as_deref(), Some("new:scope"));
    }
}
