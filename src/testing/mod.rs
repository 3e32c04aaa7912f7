//! Shared test fixtures, gated behind the `test-tools` feature so downstream crates exercising
//! this engine in their own test suites can reuse them without duplicating boilerplate.

use crate::account::{Account, IssuerMetadata};

/// An account with a fully populated, internally-consistent [`IssuerMetadata`] block already set,
/// so tests that don't care about discovery itself can skip running it.
pub fn account_with_metadata(name: &str, issuer: &str) -> Account {
    let mut account = Account::new(name, issuer, "test-client");
    account.issuer_metadata = Some(IssuerMetadata {
        issuer: issuer.to_owned(),
        authorization_endpoint: format!("{issuer}/authorize"),
        token_endpoint: format!("{issuer}/token"),
        device_authorization_endpoint: Some(format!("{issuer}/device")),
        registration_endpoint: None,
        revocation_endpoint: None,
        scopes_supported: vec!["openid".into()],
        grant_types_supported: vec![
            "refresh_token".into(),
            "password".into(),
            "authorization_code".into(),
            "urn:ietf:params:oauth:grant-type:device_code".into(),
        ],
        response_types_supported: vec!["code".into()],
    });
    account
}

/// A valid discovery document body for `issuer`, matching what [`account_with_metadata`] assumes
/// the issuer would have returned.
pub fn discovery_document(issuer: &str) -> serde_json::Value {
    serde_json::json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "device_authorization_endpoint": format!("{issuer}/device"),
        "scopes_supported": ["openid"],
        "grant_types_supported": [
            "refresh_token", "password", "authorization_code",
            "urn:ietf:params:oauth:grant-type:device_code",
        ],
    })
}

/// A successful token-endpoint response body.
pub fn token_response(access_token: &str, expires_in: i64) -> serde_json::Value {
    serde_json::json!({
        "access_token": access_token,
        "expires_in": expires_in,
    })
}
