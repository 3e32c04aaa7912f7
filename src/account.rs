//! The account record: one configured identity at one issuer, plus its cached tokens,
//! credentials, and lifetime policy.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::flow_order::FlowOrder;
use crate::secret::Secret;

/// Absolute wall-clock time expressed as seconds since the Unix epoch. `0` is used throughout
/// this crate as the "forever" sentinel for lifetime fields, matching the source's convention.
pub type UnixTime = i64;

/// The current wall-clock time, in the same units as [`UnixTime`].
pub fn now() -> UnixTime {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_secs() as UnixTime
}

/// Client credentials used to authenticate the agent itself to the issuer's token endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    /// Absent for public clients, which authenticate with `client_secret_basic: none`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<Secret>,
}

/// Issuer metadata populated by OIDC discovery. Either fully populated (discovery succeeded at
/// least once) or entirely absent; partial population is forbidden by construction -- there is no
/// way to set one field without setting them all.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuerMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub device_authorization_endpoint: Option<String>,
    pub registration_endpoint: Option<String>,
    pub revocation_endpoint: Option<String>,
    pub scopes_supported: Vec<String>,
    pub grant_types_supported: Vec<String>,
    pub response_types_supported: Vec<String>,
}

/// The tokens currently cached on an account.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CachedTokens {
    #[serde(default)]
    pub access_token: Secret,
    /// Absolute expiry of `access_token`. `0` means "unknown, treat as expired".
    #[serde(default)]
    pub expires_at: UnixTime,
    #[serde(default)]
    pub refresh_token: Secret,
    #[serde(default)]
    pub id_token: Secret,
    /// The most recently granted scope set, if the issuer reported one.
    #[serde(default)]
    pub scope: Option<String>,
}

impl CachedTokens {
    /// An access token is *present* iff it is non-empty and not yet expired. A present token may
    /// still fail a caller's `min_valid_period` check -- that's decided by the orchestrator.
    pub fn access_token_present(&self, at: UnixTime) -> bool {
        !self.access_token.is_empty() && self.expires_at > at
    }

    /// Seconds remaining before `access_token` expires, relative to `at`. Negative or zero means
    /// already expired (or no token at all).
    pub fn remaining_validity(&self, at: UnixTime) -> i64 {
        self.expires_at - at
    }

    pub fn refresh_token_present(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Username/password credentials for the password grant. The password is subject to the
/// credential lifetime policy's `pw_death` field on [`Account`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<Secret>,
}

impl Credentials {
    /// True iff both a username and a non-empty password are currently available.
    pub fn usable(&self) -> bool {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => !u.is_empty() && !p.is_empty(),
            _ => false,
        }
    }
}

/// One configured identity at one issuer, plus its cached tokens, credentials, and lifetime
/// policy. Created by the (external) loader after decryption; mutated exclusively by the flow
/// drivers in [`crate::flows`] and the credential lifetime controller in
/// [`crate::lifetime`]; destroyed by the lifetime controller on TTL expiry or by an explicit
/// unload request from the (external) account store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    /// Short name, unique within the agent.
    pub name: String,
    pub issuer_url: String,
    pub client: ClientCredentials,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub audience: Option<String>,

    /// Populated by discovery; `None` until `discover()` has succeeded at least once.
    #[serde(default)]
    pub issuer_metadata: Option<IssuerMetadata>,

    #[serde(default)]
    pub tokens: CachedTokens,
    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub flow_order: Option<FlowOrder>,

    /// Path to a CA bundle to trust for this account's issuer, or `None` for the system default.
    #[serde(default)]
    pub trust_anchor_path: Option<std::path::PathBuf>,

    /// Absolute time at which this account auto-unloads. `0` means "forever".
    #[serde(default)]
    pub death: UnixTime,
    /// Absolute time at which the stored password is wiped. `0` means "forever",
    /// and the field is conceptually absent if no password was ever stored.
    #[serde(default)]
    pub pw_death: UnixTime,
}

impl Account {
    /// Create a bare account with no cached tokens, credentials, or discovered metadata.
    pub fn new(name: impl Into<String>, issuer_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Account {
            name: name.into(),
            issuer_url: issuer_url.into(),
            client: ClientCredentials {
                client_id: client_id.into(),
                client_secret: None,
            },
            redirect_uris: Vec::new(),
            scopes: Vec::new(),
            audience: None,
            issuer_metadata: None,
            tokens: CachedTokens::default(),
            credentials: Credentials::default(),
            flow_order: None,
            trust_anchor_path: None,
            death: 0,
            pw_death: 0,
        }
    }

    /// The flow order to use for this account: its own configured order if set, else `None` so
    /// the caller/orchestrator can fall back to the agent-wide default.
    pub fn configured_flow_order(&self) -> Option<&FlowOrder> {
        self.flow_order.as_ref()
    }

    /// Read the stored password, honoring `pw_death`. If the deadline has passed, this returns
    /// `None` even though the field may not yet have been physically wiped by the lifetime
    /// controller's next sweep -- callers must never rely on the raw field directly for this
    /// reason.
    pub fn get_password(&self, at: UnixTime) -> Option<&str> {
        if self.pw_death != 0 && self.pw_death <= at {
            return None;
        }
        self.credentials
            .password
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(Secret::expose)
    }

    /// True iff this account's own death deadline has passed and it should no longer be loaded.
    pub fn is_expired(&self, at: UnixTime) -> bool {
        self.death != 0 && self.death <= at
    }

    /// Overwrite every sensitive field (password, refresh token, access token, id token, client
    /// secret) in place. Used both by the lifetime controller on account unload and by discovery
    /// helpers that operate on a throwaway account.
    pub fn wipe_secrets(&mut self) {
        self.tokens.access_token.wipe();
        self.tokens.refresh_token.wipe();
        self.tokens.id_token.wipe();
        if let Some(password) = self.credentials.password.as_mut() {
            password.wipe();
        }
        self.credentials.password = None;
        if let Some(secret) = self.client.client_secret.as_mut() {
            secret.wipe();
        }
    }

    /// Wipe only the password, leaving the account otherwise loaded and usable. Used by the
    /// lifetime controller when only `pw_death` (not `death`) has passed.
    pub fn wipe_password(&mut self) {
        if let Some(password) = self.credentials.password.as_mut() {
            password.wipe();
        }
        self.credentials.password = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_access_token_present_requires_future_expiry() {
        let mut account = Account::new("test", "https://issuer.example", "client");
        assert!(!account.tokens.access_token_present(now()));

        account.tokens.access_token = Secret::new("AT1");
        account.tokens.expires_at = now() + 600;
        assert!(account.tokens.access_token_present(now()));

        account.tokens.expires_at = now() - 1;
        assert!(!account.tokens.access_token_present(now()));
    }

    #[test]
    fn test_password_lifetime() {
        let mut account = Account::new("test", "https://issuer.example", "client");
        account.credentials.username = Some("alice".into());
        account.credentials.password = Some(Secret::new("hunter2"));
        account.pw_death = now() + 2;

        assert_eq!(account.get_password(now()), Some("hunter2"));
        assert_eq!(account.get_password(now() + 3), None);
    }

    #[test]
    fn test_account_expiry() {
        let mut account = Account::new("test", "https://issuer.example", "client");
        assert!(!account.is_expired(now()));
        account.death = now() - 1;
        assert!(account.is_expired(now()));
    }

    #[test]
    fn test_wipe_secrets_clears_everything() {
        let mut account = Account::new("test", "https://issuer.example", "client");
        account.tokens.access_token = Secret::new("AT1");
        account.tokens.refresh_token = Secret::new("RT1");
        account.credentials.password = Some(Secret::new("hunter2"));

        account.wipe_secrets();

        assert!(account.tokens.access_token.is_empty());
        assert!(account.tokens.refresh_token.is_empty());
        assert!(account.credentials.password.is_none());
    }
}
