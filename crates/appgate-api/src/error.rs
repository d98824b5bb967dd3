use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// A field-level complaint from the controller's validation layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub message: String,
}

/// Top-level error type for the `appgate-api` crate.
///
/// Covers session establishment, version negotiation, transport, and the
/// controller's structured error responses. `appgate-core` maps these into
/// context-carrying domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The login exchange failed for the negotiated client version.
    #[error("Unable to authenticate against the v{version} API: {source}")]
    LoginFailed {
        version: u32,
        #[source]
        source: Box<Error>,
    },

    /// Login rejected by the controller (wrong credentials, unknown provider, ...).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Token expired or revoked -- call `Session::establish` again.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// The session was established without credentials.
    #[error("Operation requires an authenticated session")]
    Unauthenticated,

    // ── Versioning ──────────────────────────────────────────────────
    /// Requested client version is outside the supported set.
    #[error("Unsupported API version {requested} (highest supported is {latest})")]
    UnsupportedVersion { requested: u32, latest: u32 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller responses ────────────────────────────────────────
    /// The addressed object does not exist.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// The payload violated a controller-side constraint.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Any other structured error response.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        id: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the token is gone and `establish` must run again.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if the request never produced a controller response.
    ///
    /// Informational only: nothing in this workspace retries on it.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status of the controller response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::SessionExpired => Some(401),
            Self::Validation { .. } => Some(422),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Render this error as a host-facing diagnostic.
    ///
    /// Login failures keep the wording operators already search for.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::LoginFailed { version, source } => Diagnostic::error(
                format!("Unable to create Appgate SDK client v{version}"),
                format!("Unable to authenticate user for authenticated Appgate client {source}"),
            ),
            Self::UnsupportedVersion { requested, latest } => Diagnostic::error(
                format!("Unsupported Appgate client version {requested}"),
                format!("Set client_version to a supported release; the newest known is {latest}"),
            ),
            other => Diagnostic::error("Appgate API error", other.to_string()),
        }
    }
}
