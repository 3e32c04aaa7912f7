//! A token-acquisition engine for a user-session OIDC agent.
//!
//! Given a configured [`account::Account`] (an issuer, a client, and whatever credentials or
//! cached tokens it currently holds), [`orchestrator::get_access_token`] returns a usable access
//! token: from cache if one is still valid for long enough, else by running OAuth flows in order
//! (refresh, password, authorization-code, device-code) until one succeeds.
//!
//! This crate does not open sockets, run a daemon, or store accounts on disk -- it is handed an
//! account record, a [`http::HttpTransport`], and (for the password flow) an optional
//! [`ipc::PromptChannel`], and returns a token or a typed error. The ambient [`store::AccountStore`],
//! [`config::AgentConfig`], and `oidc-agent-cli` demo binary in this crate exist to exercise the
//! engine end-to-end; a real deployment's account store, IPC transport, and browser/device-code
//! polling loops live outside it.

pub mod account;
pub mod config;
pub mod discovery;
pub mod error;
pub mod flow_order;
pub mod flows;
pub mod http;
pub mod ipc;
pub mod lifetime;
pub mod orchestrator;
pub mod secret;
pub mod store;
#[cfg(feature = "test-tools")]
pub mod testing;
pub mod token_response;

pub use account::Account;
pub use error::{OidcError, Result};
pub use flow_order::{Flow, FlowOrder};
pub use orchestrator::{get_access_token, get_access_token_with_prompt, TokenRequest};
pub use secret::Secret;
