//! The resource-owner password-credentials grant (`grant_type=password`).

use crate::account::{now, Account};
use crate::error::{OidcError, Result};
use crate::http::HttpTransport;
use crate::ipc::{PromptChannel, PromptRequest, PromptResponse};

use super::{encode_param, exchange, resolve_scope};

/// Precondition: a non-empty username and password, honoring the credential lifetime policy's
/// `pw_death` field. If no password is currently usable but `prompt` is willing to ask the caller
/// interactively, one password prompt is attempted before giving up; otherwise this fails with
/// [`OidcError::MissingCredentials`] (a skip) without making any network call.
pub async fn run(
    account: &mut Account,
    transport: &dyn HttpTransport,
    scope_override: Option<&str>,
    prompt: &dyn PromptChannel,
) -> Result<String> {
    let username = match account.credentials.username.clone() {
        Some(u) if !u.is_empty() => u,
        _ => return Err(OidcError::MissingCredentials),
    };

    let password = match account.get_password(now()) {
        Some(p) => p.to_owned(),
        None => match prompt
            .ask(PromptRequest::password_required(
                account.name.clone(),
                format!("password required to authenticate account `{}`", account.name),
            ))
            .await
        {
            PromptResponse::Password(p) if !p.is_empty() => p,
            _ => return Err(OidcError::MissingCredentials),
        },
    };

    let mut body = format!(
        "grant_type=password&{}&{}",
        encode_param("username", &username),
        encode_param("password", &password)
    );
    if let Some(scope) = resolve_scope(account, scope_override) {
        body.push('&');
        body.push_str(&encode_param("scope", &scope));
    }

    exchange(account, transport, &body).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::mock::{MockResponse, MockTransport};
    use crate::ipc::NoPrompt;
    use crate::secret::Secret;
    use crate::testing::account_with_metadata;

    fn fixture_account() -> Account {
        account_with_metadata("test", "https://iss.example")
    }

    #[tokio::test]
    async fn test_missing_credentials_is_a_skip_without_network_call() {
        let mut account = fixture_account();
        let transport = MockTransport::new();
        let err = run(&mut account, &transport, None, &NoPrompt).await.unwrap_err();
        assert!(matches!(err, OidcError::MissingCredentials));
        assert!(err.is_skip());
        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_success_stores_access_token() {
        let mut account = fixture_account();
        account.credentials.username = Some("alice".into());
        account.credentials.password = Some(Secret::new("hunter2"));
        let transport = MockTransport::new();
        transport
            .push(MockResponse::json(crate::testing::token_response("AT1", 600)))
            .await;

        let token = run(&mut account, &transport, None, &NoPrompt).await.unwrap();
        assert_eq!(token, "AT1");
    }

    #[tokio::test]
    async fn test_expired_password_skips_without_network_call() {
        let mut account = fixture_account();
        account.credentials.username = Some("alice".into());
        account.credentials.password = Some(Secret::new("hunter2"));
        account.pw_death = now() - 1;
        let transport = MockTransport::new();

        let err = run(&mut account, &transport, None, &NoPrompt).await.unwrap_err();
        assert!(matches!(err, OidcError::MissingCredentials));
        assert!(transport.calls().await.is_empty());
    }
}
