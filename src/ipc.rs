//! Minimal, serializable message types modeling the abstract "pipe pair" the core is handed by
//! the (external) IPC transport. The core never opens a socket or frames a message itself; it
//! only ever sends a [`PromptRequest`] and reads a [`PromptResponse`] through a caller-supplied
//! [`PromptChannel`], and receives a [`GrantDelivery`] alongside a `get_access_token` call when
//! the caller already has one to offer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A request sent to the caller asking it to supply a password interactively. Tagged the way the
/// wire protocol's `AUTHORIZATION_REQUIRED_WITH_MESSAGE` message is, so an external transport can
/// frame this unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptRequest {
    pub tag: &'static str,
    pub account_name: String,
    pub reason: String,
}

impl PromptRequest {
    pub fn password_required(account_name: impl Into<String>, reason: impl Into<String>) -> Self {
        PromptRequest {
            tag: "AUTHORIZATION_REQUIRED_WITH_MESSAGE",
            account_name: account_name.into(),
            reason: reason.into(),
        }
    }
}

/// The caller's reply to a [`PromptRequest`]: either a supplied password or a refusal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PromptResponse {
    Password(String),
    Refused,
}

/// A channel the orchestrator can use to ask the caller a question and block for the answer. The
/// core borrows this for the duration of one call and never retains it, matching §5's "the IPC
/// pipe pair passed into each call is borrowed" rule.
#[async_trait]
pub trait PromptChannel: Send + Sync {
    async fn ask(&self, request: PromptRequest) -> PromptResponse;
}

/// A channel that always refuses without asking anything, for flows run without interactivity
/// (e.g. a headless daemon context, or most of this crate's own tests).
pub struct NoPrompt;

#[async_trait]
impl PromptChannel for NoPrompt {
    async fn ask(&self, _request: PromptRequest) -> PromptResponse {
        PromptResponse::Refused
    }
}

/// The externally-obtained grant payload for a flow the orchestrator cannot spontaneously
/// produce. The core never initiates delivery of either variant -- a browser-redirect listener or
/// a device-code polling loop external to this crate is what hands one of these in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GrantDelivery {
    Code {
        code: String,
        redirect_uri: String,
        code_verifier: Option<String>,
    },
    Device {
        device_code: String,
    },
}
