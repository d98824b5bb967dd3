// ── Core error types ──
//
// Domain errors from appgate-core. Every remote failure carries the kind,
// identity and operation it happened on so the host can report it without
// guessing. `from_api` attaches that context to transport-layer errors.

use miette::Diagnostic;
use strum::Display;
use thiserror::Error;

use appgate_api::{FieldError, Severity};

use crate::model::{Identity, ResourceKind};

/// The adapter operation an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Lookup,
}

/// Unified error type for the core crate.
#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Unable to create Appgate SDK client v{version}")]
    #[diagnostic(
        code(appgate::auth_failed),
        help("Unable to authenticate user for authenticated Appgate client: {message}")
    )]
    Authentication { version: u32, message: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(appgate::login_rejected),
        help("Check the username, password and identity provider name")
    )]
    LoginRejected { message: String },

    #[error("Unsupported API version {requested} (highest supported is {latest})")]
    #[diagnostic(
        code(appgate::unsupported_version),
        help("Set client_version to a release between 12 and {latest}")
    )]
    UnsupportedVersion { requested: u32, latest: u32 },

    #[error("Session expired -- re-authentication required")]
    #[diagnostic(
        code(appgate::session_expired),
        help("Establish a new session; tokens are never refreshed implicitly")
    )]
    SessionExpired,

    #[error("Operation requires an authenticated session")]
    #[diagnostic(
        code(appgate::unauthenticated),
        help("Provide a username and password (APPGATE_USERNAME / APPGATE_PASSWORD)")
    )]
    Unauthenticated,

    // ── Kinds ────────────────────────────────────────────────────────
    #[error("{kind} is not available on API v{version} (requires v{required})")]
    #[diagnostic(code(appgate::unsupported_kind))]
    UnsupportedKind {
        kind: String,
        version: u32,
        required: u32,
    },

    // ── Remote objects ───────────────────────────────────────────────
    #[error("{kind} {identity} not found")]
    #[diagnostic(code(appgate::not_found))]
    NotFound { kind: String, identity: String },

    #[error("Validation failed for {kind} during {operation}: {message}")]
    #[diagnostic(code(appgate::validation))]
    Validation {
        kind: String,
        operation: Operation,
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("{operation} of {kind} {identity} failed: {message}")]
    #[diagnostic(code(appgate::remote))]
    Remote {
        kind: String,
        operation: Operation,
        identity: String,
        message: String,
        status: Option<u16>,
    },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Invalid declaration for {kind}: {message}")]
    #[diagnostic(code(appgate::invalid_declaration))]
    InvalidDeclaration { kind: String, message: String },

    #[error("{kind} {identity} is already being reconciled")]
    #[diagnostic(
        code(appgate::busy),
        help("Wait for the running pass on this object to finish")
    )]
    Busy { kind: String, identity: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(appgate::config))]
    Config { message: String },
}

impl CoreError {
    /// Attach object context to a transport-layer error.
    pub fn from_api(
        err: appgate_api::Error,
        kind: ResourceKind,
        operation: Operation,
        identity: Option<&Identity>,
    ) -> Self {
        Self::from_api_named(err, kind.type_name(), operation, identity)
    }

    /// [`from_api`](Self::from_api) for sources named outside
    /// [`ResourceKind`], such as read-only data sources.
    pub fn from_api_named(
        err: appgate_api::Error,
        kind_name: String,
        operation: Operation,
        identity: Option<&Identity>,
    ) -> Self {
        let identity = identity.map_or_else(|| "<new>".to_owned(), ToString::to_string);
        match err {
            appgate_api::Error::NotFound { .. } => CoreError::NotFound {
                kind: kind_name,
                identity,
            },
            appgate_api::Error::Validation { message, errors } => CoreError::Validation {
                kind: kind_name,
                operation,
                message,
                fields: errors,
            },
            appgate_api::Error::SessionExpired => CoreError::SessionExpired,
            appgate_api::Error::Unauthenticated => CoreError::Unauthenticated,
            other => {
                let status = other.status();
                CoreError::Remote {
                    kind: kind_name,
                    operation,
                    identity,
                    message: other.to_string(),
                    status,
                }
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Host-facing diagnostic for this error.
    pub fn diagnostic(&self) -> appgate_api::Diagnostic {
        let detail = match self {
            Self::Authentication { message, .. } => {
                format!("Unable to authenticate user for authenticated Appgate client {message}")
            }
            Self::Validation { message, fields, .. } if !fields.is_empty() => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}: {}", f.field, f.message))
                    .collect();
                format!("{message} ({})", fields.join("; "))
            }
            other => other.to_string(),
        };
        appgate_api::Diagnostic {
            severity: Severity::Error,
            summary: self.to_string(),
            detail,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<appgate_api::Error> for CoreError {
    fn from(err: appgate_api::Error) -> Self {
        match err {
            appgate_api::Error::LoginFailed { version, source } => CoreError::Authentication {
                version,
                message: source.to_string(),
            },
            appgate_api::Error::Authentication { message } => CoreError::LoginRejected { message },
            appgate_api::Error::UnsupportedVersion { requested, latest } => {
                CoreError::UnsupportedVersion { requested, latest }
            }
            appgate_api::Error::SessionExpired => CoreError::SessionExpired,
            appgate_api::Error::Unauthenticated => CoreError::Unauthenticated,
            appgate_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            appgate_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            other => {
                let status = other.status();
                CoreError::Remote {
                    kind: "session".into(),
                    operation: Operation::Read,
                    identity: String::new(),
                    message: other.to_string(),
                    status,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_kind_and_identity() {
        let id = Identity::from("c-1");
        let err = CoreError::from_api(
            appgate_api::Error::NotFound {
                path: "conditions/c-1".into(),
            },
            ResourceKind::Condition,
            Operation::Read,
            Some(&id),
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "appgate_condition c-1 not found");
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = CoreError::from_api(
            appgate_api::Error::Validation {
                message: "Request validation failed.".into(),
                errors: vec![FieldError {
                    field: "expression".into(),
                    message: "must not be empty".into(),
                }],
            },
            ResourceKind::Condition,
            Operation::Create,
            None,
        );
        match &err {
            CoreError::Validation { message, fields, .. } => {
                assert_eq!(message, "Request validation failed.");
                assert_eq!(fields.len(), 1);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(err.diagnostic().detail.contains("expression: must not be empty"));
    }

    #[test]
    fn other_failures_name_the_operation() {
        let err = CoreError::from_api(
            appgate_api::Error::Api {
                status: 409,
                message: "conflict".into(),
                id: None,
            },
            ResourceKind::Site,
            Operation::Update,
            Some(&Identity::from("s-1")),
        );
        assert_eq!(
            err.to_string(),
            "update of appgate_site s-1 failed: API error (HTTP 409): conflict"
        );
        match err {
            CoreError::Remote { status, .. } => assert_eq!(status, Some(409)),
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn login_failure_keeps_version() {
        let err = CoreError::from(appgate_api::Error::LoginFailed {
            version: 14,
            source: Box::new(appgate_api::Error::Authentication {
                message: "bad password".into(),
            }),
        });
        assert_eq!(err.to_string(), "Unable to create Appgate SDK client v14");
        assert!(err.diagnostic().detail.contains("bad password"));
    }

    #[test]
    fn bare_authentication_failure_claims_no_version() {
        let err = CoreError::from(appgate_api::Error::Authentication {
            message: "login failed (HTTP 401)".into(),
        });
        assert!(matches!(err, CoreError::LoginRejected { .. }), "{err:?}");
        assert_eq!(err.to_string(), "Authentication failed: login failed (HTTP 401)");
        assert!(!err.to_string().contains("v0"));
    }
}
