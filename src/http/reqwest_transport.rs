//! Production [`HttpTransport`] backed by [`reqwest`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client};
use tokio::sync::Mutex;

use super::{require_https, BasicAuth, HttpTransport};
use crate::error::{OidcError, Result};

/// A `reqwest`-backed transport. Clients are built lazily per trust-anchor path and cached, since
/// building a `reqwest::Client` with a custom root certificate is comparatively expensive and
/// each account typically reuses the same trust anchor across many calls.
pub struct ReqwestTransport {
    connect_timeout: Duration,
    total_timeout: Duration,
    clients: Mutex<std::collections::HashMap<(Option<PathBuf>, bool), Client>>,
}

impl ReqwestTransport {
    /// Create a transport with the given connect and total request timeouts.
    pub fn new(connect_timeout: Duration, total_timeout: Duration) -> Self {
        ReqwestTransport {
            connect_timeout,
            total_timeout,
            clients: Mutex::new(std::collections::HashMap::new()),
        }
    }

    async fn client_for(&self, trust_anchor: Option<&Path>, follow_redirects: bool) -> Result<Client> {
        // Keyed on both the trust anchor and the redirect policy: a GET (discovery, up to one
        // redirect) and a POST (token endpoint, never followed) must never share a cached client,
        // or whichever one built the client first silently dictates the other's redirect policy.
        let key = (trust_anchor.map(Path::to_path_buf), follow_redirects);
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let mut builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.total_timeout)
            .redirect(if follow_redirects {
                reqwest::redirect::Policy::limited(1)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(path) = trust_anchor {
            let pem = std::fs::read(path)?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                OidcError::Other(format!("invalid trust anchor at {}: {e}", path.display()))
            })?;
            builder = builder.add_root_certificate(cert).tls_built_in_root_certs(false);
        }

        let client = builder.build()?;
        clients.insert(key, client.clone());
        Ok(client)
    }

    async fn read_response(resp: reqwest::Response) -> Result<Vec<u8>> {
        let status = resp.status();
        let body = resp.bytes().await?;
        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(OidcError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, trust_anchor: Option<&Path>) -> Result<Vec<u8>> {
        require_https(url)?;
        let client = self.client_for(trust_anchor, true).await?;
        let resp = client.get(url).send().await?;
        Self::read_response(resp).await
    }

    async fn post_form(
        &self,
        url: &str,
        body: &str,
        trust_anchor: Option<&Path>,
        basic_auth: Option<BasicAuth<'_>>,
    ) -> Result<Vec<u8>> {
        require_https(url)?;
        let client = self.client_for(trust_anchor, false).await?;
        let mut builder = client
            .post(url)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_owned());
        if let Some((client_id, client_secret)) = basic_auth {
            builder = builder.basic_auth(client_id, client_secret);
        }
        let resp = builder.send().await?;
        Self::read_response(resp).await
    }
}

/// A clonable handle around a shared [`ReqwestTransport`], convenient for wiring into the
/// orchestrator without giving every call site a raw `Arc`.
pub type SharedTransport = Arc<dyn HttpTransport>;
