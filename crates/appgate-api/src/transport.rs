// Shared transport configuration for building reqwest::Client instances.
//
// TLS mode, the per-call timeout, and the version-specific default headers
// all live here so the session manager never touches the builder directly.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::Error;
use crate::version::ClientSurface;

/// Default timeout applied to every outbound round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// TLS verification mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (controllers commonly ship self-signed).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Transport matching the `insecure` flag of a credential set.
    pub fn for_insecure(insecure: bool) -> Self {
        Self {
            tls: if insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` that speaks the given API surface.
    ///
    /// The surface's peer media type is installed as the default `Accept`
    /// header, so every request (login included) negotiates the same revision.
    pub fn build_client(&self, surface: &ClientSurface) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&surface.media_type())
            .map_err(|e| Error::Tls(format!("invalid media type header: {e}")))?;
        headers.insert(ACCEPT, accept);

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("appgate-reconcile/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}
