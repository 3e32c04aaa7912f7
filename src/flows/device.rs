//! The device-authorization grant
//! (`grant_type=urn:ietf:params:oauth:grant-type:device_code`), RFC 8628.
//!
//! Polling is the responsibility of the caller; a single invocation performs exactly one
//! token-endpoint exchange. `authorization_pending`, `slow_down`, `access_denied`, and
//! `expired_token` are reported verbatim as [`crate::error::OidcError::Oidc`] so the caller can
//! decide whether to poll again.

use crate::account::Account;
use crate::error::Result;
use crate::http::HttpTransport;

use super::{encode_param, exchange};

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Exchange an externally-obtained `device_code` for tokens, performing exactly one request.
pub async fn run(
    account: &mut Account,
    transport: &dyn HttpTransport,
    device_code: &str,
) -> Result<String> {
    let body = format!(
        "{}&{}",
        encode_param("grant_type", DEVICE_GRANT_TYPE),
        encode_param("device_code", device_code)
    );

    exchange(account, transport, &body).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::OidcError;
    use crate::http::mock::{MockResponse, MockTransport};
    use crate::testing::account_with_metadata;
    use serde_json::json;

    fn fixture_account() -> Account {
        account_with_metadata("test", "https://iss.example")
    }

    #[tokio::test]
    async fn test_success() {
        let mut account = fixture_account();
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(crate::testing::token_response("AT1", 600)))
            .await;

        let token = run(&mut account, &transport, "DC1").await.unwrap();
        assert_eq!(token, "AT1");

        let calls = transport.calls().await;
        let body = calls[0].body.as_deref().unwrap();
        assert!(body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Adevice_code"));
        assert!(body.contains("device_code=DC1"));
    }

    #[tokio::test]
    async fn test_authorization_pending_reported_verbatim() {
        let mut account = fixture_account();
        let transport = MockTransport::new();
        transport
            .push(MockResponse::Status {
                status: 400,
                body: json!({ "error": "authorization_pending" }).to_string().into_bytes(),
            })
            .await;

        let err = run(&mut account, &transport, "DC1").await.unwrap_err();
        match err {
            OidcError::Oidc { error, .. } => assert_eq!(error, "authorization_pending"),
            other => panic!("expected Oidc error, got {other:?}"),
        }
    }
}
