//! A scriptable in-memory [`HttpTransport`] for tests. Only available with the `test-tools`
//! feature, mirroring the source crate's own `test-tools` feature gate for its test scaffolding.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{BasicAuth, HttpTransport};
use crate::error::{OidcError, Result};

/// One scripted response: either a successful body or an HTTP-status failure.
#[derive(Clone, Debug)]
pub enum MockResponse {
    Ok(Vec<u8>),
    Status { status: u16, body: Vec<u8> },
    Transport(String),
}

impl MockResponse {
    /// A successful JSON body.
    pub fn json(value: serde_json::Value) -> Self {
        MockResponse::Ok(serde_json::to_vec(&value).expect("serializing a Value cannot fail"))
    }

    fn into_result(self) -> Result<Vec<u8>> {
        match self {
            MockResponse::Ok(body) => Ok(body),
            MockResponse::Status { status, body } => Err(OidcError::HttpStatus {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            MockResponse::Transport(msg) => Err(OidcError::Transport(msg)),
        }
    }
}

/// One recorded call made through a [`MockTransport`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

/// A transport that returns pre-scripted responses in FIFO order and records every call made
/// through it, so tests can assert both on outcomes and on "no HTTP call was made" (the cache-hit
/// scenario).
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to be returned by the next call (GET or POST).
    pub async fn push(&self, response: MockResponse) {
        self.responses.lock().await.push_back(response);
    }

    /// The calls made through this transport so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    async fn next_response(&self) -> Result<Vec<u8>> {
        let response = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockResponse::Transport("no response scripted".into()));
        response.into_result()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, _trust_anchor: Option<&Path>) -> Result<Vec<u8>> {
        self.calls.lock().await.push(RecordedCall {
            method: "GET",
            url: url.to_owned(),
            body: None,
        });
        self.next_response().await
    }

    async fn post_form(
        &self,
        url: &str,
        body: &str,
        _trust_anchor: Option<&Path>,
        _basic_auth: Option<BasicAuth<'_>>,
    ) -> Result<Vec<u8>> {
        self.calls.lock().await.push(RecordedCall {
            method: "POST",
            url: url.to_owned(),
            body: Some(body.to_owned()),
        });
        self.next_response().await
    }
}
