//! The core's error taxonomy. Every fallible operation in this crate returns
//! `Result<T, OidcError>`; there is no process-wide error variable.

use thiserror::Error;

/// Describes the various errors that can be returned from the token-acquisition engine.
#[derive(Error, Debug)]
pub enum OidcError {
    /// No refresh token is stored on the account.
    #[error("no refresh token available for this account")]
    NoRefreshToken,

    /// The password flow was attempted but no username/password is available.
    #[error("no usable credentials available for this account")]
    MissingCredentials,

    /// The issuer rejected the refresh token (`invalid_grant`). The caller's stored refresh
    /// token has already been cleared by the time this is returned.
    #[error("refresh token was revoked by the issuer: {0}")]
    Revoked(String),

    /// The issuer returned a structured OAuth error not otherwise classified.
    #[error("issuer returned an OAuth error `{error}`: {description}")]
    Oidc {
        /// The `error` field of the OAuth error object.
        error: String,
        /// The `error_description` field, or a placeholder if the issuer didn't supply one.
        description: String,
    },

    /// Malformed JSON, or a required field was missing from a discovery document or token
    /// response.
    #[error("malformed response from issuer: {0}")]
    MalformedResponse(String),

    /// The issuer returned by discovery did not match the account's configured issuer.
    #[error("discovery issuer mismatch: configured `{configured}`, discovered `{discovered}`")]
    IssuerMismatch {
        /// The issuer URL configured on the account.
        configured: String,
        /// The issuer URL actually returned in the discovery document.
        discovered: String,
    },

    /// A TLS or lower-level transport failure talking to the issuer.
    #[error("transport error contacting issuer: {0}")]
    Transport(String),

    /// The issuer responded with a non-2xx status. Carries the status code and the raw body so
    /// callers can extract an OAuth `error`/`error_description` themselves if desired.
    #[error("issuer responded with HTTP {status}: {body}")]
    HttpStatus {
        /// The numeric HTTP status code.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// Every flow in the configured order was skipped; no flow had a satisfied precondition.
    #[error("no flow in the configured order could run")]
    NoFlowAvailable,

    /// The account named by a caller is not currently loaded (or has auto-unloaded).
    #[error("account `{0}` is not loaded")]
    UnknownAccount(String),

    /// The requested URL was not an absolute `https://` URL.
    #[error("URL must be an absolute https:// URL: {0}")]
    InvalidUrl(String),

    /// A lower-level URL parsing failure.
    #[error("invalid URL")]
    UrlParse(#[from] url::ParseError),

    /// A lower-level I/O failure (e.g. reading a trust-anchor file or a config file).
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// A lower-level HTTP client failure.
    #[error("HTTP client error")]
    Http(#[from] reqwest::Error),

    /// A lower-level JSON (de)serialization failure.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// A catch-all for uncategorized errors, carrying a human-readable message.
    #[error("{0}")]
    Other(String),
}

/// A stable, small numeric identifier for an [`OidcError`], suitable for passing to a caller over
/// IPC without exposing this crate's internal type. Mirrors the legacy `oidc_errno` convention
/// described in the design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorKind {
    /// operation succeeded
    Success = 0,
    /// no refresh token on account
    NoRefreshToken = 1,
    /// missing username/password for password flow
    MissingCredentials = 2,
    /// issuer rejected refresh token (`invalid_grant`)
    Revoked = 3,
    /// issuer returned a structured OAuth error not otherwise classified
    Oidc = 4,
    /// malformed JSON or missing required field
    MalformedResponse = 5,
    /// discovery issuer mismatch
    IssuerMismatch = 6,
    /// transport / TLS failure
    Transport = 7,
    /// all flows in the configured order were skipped
    NoFlowAvailable = 8,
    /// account is not loaded
    UnknownAccount = 9,
    /// anything not covered above
    Other = 99,
}

impl OidcError {
    /// Map this error onto the stable numeric taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OidcError::NoRefreshToken => ErrorKind::NoRefreshToken,
            OidcError::MissingCredentials => ErrorKind::MissingCredentials,
            OidcError::Revoked(_) => ErrorKind::Revoked,
            OidcError::Oidc { .. } => ErrorKind::Oidc,
            OidcError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            OidcError::IssuerMismatch { .. } => ErrorKind::IssuerMismatch,
            OidcError::Transport(_) | OidcError::Http(_) => ErrorKind::Transport,
            OidcError::NoFlowAvailable => ErrorKind::NoFlowAvailable,
            OidcError::UnknownAccount(_) => ErrorKind::UnknownAccount,
            OidcError::HttpStatus { .. }
            | OidcError::InvalidUrl(_)
            | OidcError::UrlParse(_)
            | OidcError::Io(_)
            | OidcError::Json(_)
            | OidcError::Other(_) => ErrorKind::Other,
        }
    }

    /// True if this error represents a "skip" condition: a flow whose precondition was not met,
    /// as opposed to a hard failure. Skips are swallowed by the orchestrator to allow fallback to
    /// the next flow in the order; hard failures stop the fallback chain immediately.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            OidcError::NoRefreshToken | OidcError::MissingCredentials | OidcError::NoFlowAvailable
        )
    }

    /// Precedence used when every flow in the order was skipped and the orchestrator must choose
    /// the single most specific skip reason to report: `ECRED` > `ENOREFRSH` > generic `ENOFLOW`.
    fn skip_precedence(&self) -> u8 {
        match self {
            OidcError::MissingCredentials => 2,
            OidcError::NoRefreshToken => 1,
            _ => 0,
        }
    }

    /// Given two skip errors encountered in order, keep the one with the higher precedence,
    /// preferring the earlier of two equally-specific skips (the orchestrator's tie-break rule).
    pub fn more_specific_skip(self, other: OidcError) -> OidcError {
        if other.skip_precedence() > self.skip_precedence() {
            other
        } else {
            self
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OidcError>;
