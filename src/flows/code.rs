//! The authorization-code grant (`grant_type=authorization_code`), with optional PKCE.
//!
//! The core neither opens browsers nor runs redirect servers; those are external collaborators
//! that deliver `code` over the IPC pipe. This driver only ever performs the token-endpoint
//! exchange for a `code` the caller already obtained.

use crate::account::Account;
use crate::error::Result;
use crate::http::HttpTransport;

use super::{encode_param, exchange};

/// Exchange an externally-obtained authorization `code` for tokens. `redirect_uri` must be the
/// exact URI used when the code was issued; `code_verifier` is supplied when the authorization
/// request used PKCE.
pub async fn run(
    account: &mut Account,
    transport: &dyn HttpTransport,
    code: &str,
    redirect_uri: &str,
    code_verifier: Option<&str>,
) -> Result<String> {
    let mut body = format!(
        "grant_type=authorization_code&{}&{}",
        encode_param("code", code),
        encode_param("redirect_uri", redirect_uri)
    );
    if let Some(verifier) = code_verifier {
        body.push('&');
        body.push_str(&encode_param("code_verifier", verifier));
    }

    exchange(account, transport, &body).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::mock::{MockResponse, MockTransport};
    use crate::testing::account_with_metadata;

    fn fixture_account() -> Account {
        account_with_metadata("test", "https://iss.example")
    }

    #[tokio::test]
    async fn test_success_with_pkce() {
        let mut account = fixture_account();
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(crate::testing::token_response("AT1", 600)))
            .await;

        let token = run(
            &mut account,
            &transport,
            "AUTHCODE1",
            "https://localhost:4321/callback",
            Some("verifier123"),
        )
        .await
        .unwrap();
        assert_eq!(token, "AT1");

        let calls = transport.calls().await;
        let body = calls[0].body.as_deref().unwrap();
        assert!(body.contains("grant_type=authorization_code"));
        assert!(body.contains("code=AUTHCODE1"));
        assert!(body.contains("code_verifier=verifier123"));
    }
}
