// ── Runtime connection configuration ──
//
// These types describe *how* to reach one controller. They carry credential
// data and connection tuning, but never touch disk or the environment.
// The host (or `appgate-config`) constructs a `ProviderConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use appgate_api::{
    Credentials, DEFAULT_CLIENT_VERSION, DEFAULT_IDENTITY_PROVIDER, DEFAULT_TIMEOUT,
    TlsMode, TransportConfig,
};

/// Configuration for one provider instance.
///
/// Several can coexist in one process; nothing here is global.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Admin API root, e.g. `https://controller.example.com:8443/admin`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Identity provider to log in through (defaults to `local`).
    pub provider: String,
    /// Accept self-signed controller certificates.
    pub insecure: bool,
    /// PEM bundle to verify the controller against when not insecure.
    pub ca_cert: Option<PathBuf>,
    /// Trace request and response bodies.
    pub debug: bool,
    /// Requested API revision.
    pub client_version: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            username: String::new(),
            password: SecretString::from(String::new()),
            provider: DEFAULT_IDENTITY_PROVIDER.to_owned(),
            insecure: true,
            ca_cert: None,
            debug: false,
            client_version: DEFAULT_CLIENT_VERSION,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_login(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = username.into();
        self.password = password;
        self
    }

    pub fn credentials(&self) -> Credentials {
        let mut creds = Credentials::new(self.url.clone(), &self.username, self.password.clone());
        creds.identity_provider.clone_from(&self.provider);
        creds.insecure = self.insecure;
        creds.debug = self.debug;
        creds
    }

    pub fn transport(&self) -> TransportConfig {
        let mut transport = TransportConfig::for_insecure(self.insecure).with_timeout(self.timeout);
        if let (false, Some(path)) = (self.insecure, &self.ca_cert) {
            transport.tls = TlsMode::CustomCa(path.clone());
        }
        transport
    }
}
