//! Agent-wide configuration, layered the way the corpus layers settings that sit above any single
//! account: compiled-in defaults, then an optional TOML file, then environment variable
//! overrides. This is an ambient concern of the demo binary and test harness, not the engine
//! itself -- the engine only ever consumes the already-resolved [`AgentConfig`] fields it needs.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OidcError, Result};
use crate::flow_order::FlowOrder;

/// Environment variable naming an explicit config file to load, overriding the default search
/// path. Distinct from, and not to be confused with, `OIDCD_PID`/`OIDC_SOCK`, which name sockets
/// managed entirely by the external daemon and are never read by this crate.
pub const ENV_CONFIG_PATH: &str = "OIDC_AGENT_CONFIG";
/// Environment variable overriding the default flow order, in the same bare comma-separated or
/// JSON-array form [`FlowOrder`] accepts elsewhere.
pub const ENV_DEFAULT_FLOW_ORDER: &str = "OIDC_AGENT_DEFAULT_FLOW_ORDER";
/// Environment variable overriding the HTTP connect/total timeout, in whole seconds.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "OIDC_AGENT_HTTP_TIMEOUT_SECS";

/// Agent-wide defaults not carried by any individual account.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// The flow order used when an account has no order of its own and the caller supplied none.
    pub default_flow_order: FlowOrder,
    /// The minimum-validity grace period the demo CLI applies when the caller doesn't specify one.
    pub default_min_valid_secs: i64,
    /// Timeout applied to both connecting to, and completing a request against, the token and
    /// discovery endpoints.
    pub http_timeout_secs: u64,
    /// Trust anchor used for accounts that don't configure their own.
    pub default_trust_anchor_path: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            default_flow_order: FlowOrder::default(),
            default_min_valid_secs: 60,
            http_timeout_secs: 30,
            default_trust_anchor_path: None,
        }
    }
}

impl AgentConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Load the layered configuration: compiled-in defaults, then the TOML file at
    /// `explicit_path` (if given) or named by `OIDC_AGENT_CONFIG` (if set) -- a missing file at
    /// either location is not an error, it just means "no file layer" -- then environment
    /// variable overrides.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Result<Self> {
        let mut config = AgentConfig::default();

        let file_path = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));

        if let Some(path) = file_path {
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    let from_file: AgentConfig = toml::from_str(&contents).map_err(|e| {
                        OidcError::Other(format!("failed to parse config file {path:?}: {e}"))
                    })?;
                    config = from_file;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(OidcError::Io(e)),
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(ENV_DEFAULT_FLOW_ORDER) {
            self.default_flow_order = FlowOrder::parse_bare(&raw)
                .map_err(|e| OidcError::Other(format!("{ENV_DEFAULT_FLOW_ORDER}: {e}")))?;
        }
        if let Ok(raw) = std::env::var(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout_secs = raw.parse().map_err(|_| {
                OidcError::Other(format!(
                    "{ENV_HTTP_TIMEOUT_SECS} must be a non-negative integer, got `{raw}`"
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_with_no_file_and_no_env() {
        let config = AgentConfig::default();
        assert_eq!(config.default_min_valid_secs, 60);
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = AgentConfig::load(Some(std::path::Path::new("/nonexistent/path.toml")));
        assert!(config.is_ok());
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"default_min_valid_secs = 120"#).unwrap();
        writeln!(file, r#"http_timeout_secs = 5"#).unwrap();

        let config = AgentConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.default_min_valid_secs, 120);
        assert_eq!(config.http_timeout_secs, 5);
    }

    #[test]
    fn test_env_override_beats_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"http_timeout_secs = 5"#).unwrap();

        std::env::set_var(ENV_HTTP_TIMEOUT_SECS, "9");
        let config = AgentConfig::load(Some(file.path())).unwrap();
        std::env::remove_var(ENV_HTTP_TIMEOUT_SECS);

        assert_eq!(config.http_timeout_secs, 9);
    }

    #[test]
    fn test_bare_flow_order_env_override() {
        std::env::set_var(ENV_DEFAULT_FLOW_ORDER, "refresh,device");
        let config = AgentConfig::load(Some(std::path::Path::new("/nonexistent/path.toml"))).unwrap();
        std::env::remove_var(ENV_DEFAULT_FLOW_ORDER);

        let flows: Vec<_> = config.default_flow_order.iter().collect();
        assert_eq!(flows, vec![crate::flow_order::Flow::Refresh, crate::flow_order::Flow::Device]);
    }
}
