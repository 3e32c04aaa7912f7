//! The HTTP client adapter: a pluggable transport so the discovery and flow-driver code never
//! depends directly on a concrete HTTP client crate.

mod reqwest_transport;

#[cfg(feature = "test-tools")]
pub mod mock;

pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;
use std::path::Path;

use crate::error::{OidcError, Result};

/// An already-encoded `Authorization: Basic` credential pair.
pub type BasicAuth<'a> = (&'a str, Option<&'a str>);

/// The abstract GET/POST capability the engine needs from an HTTP client. Implementations must
/// verify TLS certificates unconditionally; `trust_anchor` selects which CA bundle to trust
/// (`None` means "system default").
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request. At most one redirect is followed (for OIDC discovery documents).
    async fn get(&self, url: &str, trust_anchor: Option<&Path>) -> Result<Vec<u8>>;

    /// Issue a `POST` of an already `application/x-www-form-urlencoded`-encoded body. No
    /// redirects are followed (token-endpoint semantics require the literal response).
    async fn post_form(
        &self,
        url: &str,
        body: &str,
        trust_anchor: Option<&Path>,
        basic_auth: Option<BasicAuth<'_>>,
    ) -> Result<Vec<u8>>;
}

/// Reject anything that isn't an absolute `https://` URL. Shared by every transport
/// implementation so the "reject non-https" rule can't be accidentally skipped by one of them.
pub fn require_https(url: &str) -> Result<()> {
    if url.starts_with("https://") {
        Ok(())
    } else {
        Err(OidcError::InvalidUrl(url.to_owned()))
    }
}
