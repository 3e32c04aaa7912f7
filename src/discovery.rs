//! OIDC discovery: fetches and parses an issuer's `.well-known/openid-configuration` document.

use serde::Deserialize;
use tracing::debug;

use crate::account::{Account, IssuerMetadata};
use crate::error::{OidcError, Result};
use crate::http::HttpTransport;

const DISCOVERY_SUFFIX: &str = "/.well-known/openid-configuration";

#[derive(Deserialize)]
struct RawDiscoveryDocument {
    issuer: Option<String>,
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
    #[serde(default)]
    device_authorization_endpoint: Option<String>,
    #[serde(default)]
    registration_endpoint: Option<String>,
    #[serde(default)]
    revocation_endpoint: Option<String>,
    #[serde(default)]
    scopes_supported: Vec<String>,
    #[serde(default)]
    grant_types_supported: Vec<String>,
    #[serde(default)]
    response_types_supported: Vec<String>,
}

/// Fetch and parse the discovery document for `account.issuer_url`, populating
/// `account.issuer_metadata` on success. Safe to call repeatedly: each call re-fetches and
/// re-validates, so two back-to-back calls yield identical metadata (idempotence is the caller's
/// responsibility to exploit via caching, e.g. [`crate::orchestrator`] never calls this more than
/// once per account per process unless asked to).
pub async fn discover(account: &mut Account, transport: &dyn HttpTransport) -> Result<()> {
    let metadata = fetch_metadata(
        &account.issuer_url,
        account.trust_anchor_path.as_deref(),
        transport,
    )
    .await?;
    account.issuer_metadata = Some(metadata);
    Ok(())
}

/// A read-only helper used by account creation: runs discovery against an ephemeral account and
/// returns the space-separated `scopes_supported`. The ephemeral account never holds real
/// credentials, so there is nothing to wipe beyond dropping it, but we wipe explicitly anyway to
/// keep the guarantee obvious at the call site.
pub async fn scopes_supported_for(
    issuer_url: &str,
    transport: &dyn HttpTransport,
) -> Result<String> {
    let mut ephemeral = Account::new("__discovery_probe__", issuer_url, "");
    discover(&mut ephemeral, transport).await?;
    let scopes = ephemeral
        .issuer_metadata
        .as_ref()
        .map(|m| m.scopes_supported.join(" "))
        .unwrap_or_default();
    ephemeral.wipe_secrets();
    Ok(scopes)
}

async fn fetch_metadata(
    issuer_url: &str,
    trust_anchor: Option<&std::path::Path>,
    transport: &dyn HttpTransport,
) -> Result<IssuerMetadata> {
    let normalized_issuer = issuer_url.trim_end_matches('/');
    let discovery_url = format!("{normalized_issuer}{DISCOVERY_SUFFIX}");
    debug!(url = %discovery_url, "fetching discovery document");
    let body = transport.get(&discovery_url, trust_anchor).await?;
    debug!(bytes = body.len(), "discovery document received");

    let raw: RawDiscoveryDocument = serde_json::from_slice(&body)
        .map_err(|e| OidcError::MalformedResponse(e.to_string()))?;

    let issuer = raw
        .issuer
        .ok_or_else(|| OidcError::MalformedResponse("discovery document missing issuer".into()))?;
    let authorization_endpoint = raw.authorization_endpoint.ok_or_else(|| {
        OidcError::MalformedResponse("discovery document missing authorization_endpoint".into())
    })?;
    let token_endpoint = raw.token_endpoint.ok_or_else(|| {
        OidcError::MalformedResponse("discovery document missing token_endpoint".into())
    })?;

    if issuer.trim_end_matches('/') != normalized_issuer {
        return Err(OidcError::IssuerMismatch {
            configured: normalized_issuer.to_owned(),
            discovered: issuer,
        });
    }

    Ok(IssuerMetadata {
        issuer,
        authorization_endpoint,
        token_endpoint,
        device_authorization_endpoint: raw.device_authorization_endpoint,
        registration_endpoint: raw.registration_endpoint,
        revocation_endpoint: raw.revocation_endpoint,
        scopes_supported: raw.scopes_supported,
        grant_types_supported: raw.grant_types_supported,
        response_types_supported: raw.response_types_supported,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::mock::{MockResponse, MockTransport};
    use serde_json::json;

    fn valid_document(issuer: &str) -> serde_json::Value {
        json!({
            "issuer": issuer,
            "authorization_endpoint": format!("{issuer}/authorize"),
            "token_endpoint": format!("{issuer}/token"),
            "device_authorization_endpoint": format!("{issuer}/device"),
            "scopes_supported": ["openid", "profile"],
            "grant_types_supported": ["authorization_code", "refresh_token"],
        })
    }

    #[tokio::test]
    async fn test_discover_populates_metadata() {
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(valid_document("https://iss.example")))
            .await;
        let mut account = Account::new("test", "https://iss.example", "client");

        discover(&mut account, &transport).await.unwrap();

        let metadata = account.issuer_metadata.unwrap();
        assert_eq!(metadata.token_endpoint, "https://iss.example/token");
        assert_eq!(metadata.scopes_supported, vec!["openid", "profile"]);
    }

    #[tokio::test]
    async fn test_discover_is_idempotent() {
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(valid_document("https://iss.example")))
            .await;
        transport
            .push(MockResponse::json(valid_document("https://iss.example")))
            .await;
        let mut account = Account::new("test", "https://iss.example", "client");

        discover(&mut account, &transport).await.unwrap();
        let first = account.issuer_metadata.clone().unwrap();
        discover(&mut account, &transport).await.unwrap();
        let second = account.issuer_metadata.clone().unwrap();

        assert_eq!(first.token_endpoint, second.token_endpoint);
        assert_eq!(first.scopes_supported, second.scopes_supported);
    }

    #[tokio::test]
    async fn test_issuer_mismatch_fails_and_leaves_metadata_empty() {
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(valid_document("https://other.example")))
            .await;
        let mut account = Account::new("test", "https://iss.example", "client");

        let err = discover(&mut account, &transport).await.unwrap_err();
        assert!(matches!(err, OidcError::IssuerMismatch { .. }));
        assert!(account.issuer_metadata.is_none());
    }

    #[tokio::test]
    async fn test_missing_required_field_fails() {
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(json!({ "issuer": "https://iss.example" })))
            .await;
        let mut account = Account::new("test", "https://iss.example", "client");

        let err = discover(&mut account, &transport).await.unwrap_err();
        assert!(matches!(err, OidcError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_trailing_slash_normalised() {
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(valid_document("https://iss.example")))
            .await;
        let mut account = Account::new("test", "https://iss.example/", "client");

        discover(&mut account, &transport).await.unwrap();
        assert!(account.issuer_metadata.is_some());
    }
}
