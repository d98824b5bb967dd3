// Session management
//
// A session is one HTTP client bound to one negotiated API revision and,
// when credentials were supplied, one bearer token. It is immutable after
// `establish` returns and can be shared across tasks behind an `Arc`.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::auth::{Credentials, LoginRequest, LoginResponse, Token};
use crate::diagnostic::Diagnostic;
use crate::error::Error;
use crate::request::preview;
use crate::transport::TransportConfig;
use crate::version::{ApiVersion, ClientSurface};

/// Summary of the warning attached to credential-less sessions.
pub const UNAUTHENTICATED_SUMMARY: &str = "Using unauthenticated Appgate client";

/// An established session plus the diagnostics produced while building it.
#[derive(Debug)]
pub struct Established {
    pub session: Session,
    pub diagnostics: Vec<Diagnostic>,
}

/// Authenticated (or deliberately unauthenticated) handle to one controller.
#[derive(Debug)]
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    surface: ClientSurface,
    token: Option<Token>,
    timeout_secs: u64,
    debug: bool,
}

impl Session {
    /// Establish a session with the default transport for these credentials.
    pub async fn establish(
        credentials: &Credentials,
        version: Option<u32>,
    ) -> Result<Established, Error> {
        let transport = TransportConfig::for_insecure(credentials.insecure);
        Self::establish_with_transport(credentials, version, &transport).await
    }

    /// Establish a session with an explicit transport configuration.
    ///
    /// 1. Resolve the requested version (fatal if unsupported).
    /// 2. Without a username or password, return an unauthenticated session
    ///    and a warning diagnostic -- no network I/O.
    /// 3. Otherwise perform exactly one login round trip. Failures are
    ///    returned as [`Error::LoginFailed`] and never retried.
    pub async fn establish_with_transport(
        credentials: &Credentials,
        version: Option<u32>,
        transport: &TransportConfig,
    ) -> Result<Established, Error> {
        let surface = ClientSurface::resolve(version)?;
        let http = transport.build_client(&surface)?;
        let base_url = normalize_base_url(&credentials.url);

        let mut session = Self {
            http,
            base_url,
            surface,
            token: None,
            timeout_secs: transport.timeout_secs(),
            debug: credentials.debug,
        };

        if !credentials.is_complete() {
            warn!(url = %session.base_url, "no credentials supplied, continuing unauthenticated");
            return Ok(Established {
                session,
                diagnostics: vec![Diagnostic::warning(
                    UNAUTHENTICATED_SUMMARY,
                    "Appgate client is unauthenticated. Provide user credentials to access restricted resources.",
                )],
            });
        }

        let token = session
            .login(credentials)
            .await
            .map_err(|e| Error::LoginFailed {
                version: surface.version().get(),
                source: Box::new(e),
            })?;
        session.token = Some(token);

        info!(
            url = %session.base_url,
            version = %surface.version(),
            provider = %credentials.identity_provider,
            "session established"
        );
        Ok(Established {
            session,
            diagnostics: Vec::new(),
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<Token, Error> {
        let url = self.url("login")?;
        debug!("logging in at {url}");

        let body = LoginRequest {
            provider_name: &credentials.identity_provider,
            username: &credentials.username,
            password: credentials.password.expose_secret(),
            device_id: Uuid::new_v4(),
        };

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (login response)"),
                body: String::new(),
            })?;

        debug!(expires = ?login.expires, "login successful");
        Ok(Token::new(SecretString::from(login.token), login.expires))
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The negotiated API surface.
    pub fn surface(&self) -> &ClientSurface {
        &self.surface
    }

    pub fn version(&self) -> ApiVersion {
        self.surface.version()
    }

    /// The admin API root (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// The bearer token for an identity-requiring call.
    ///
    /// Expiry is checked here, before anything goes on the wire.
    pub(crate) fn bearer(&self) -> Result<&Token, Error> {
        let token = self.token.as_ref().ok_or(Error::Unauthenticated)?;
        if token.is_expired_at(Utc::now()) {
            return Err(Error::SessionExpired);
        }
        Ok(token)
    }

    /// Join a relative resource path onto the API root.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Map a reqwest failure, separating the call timeout out.
    pub(crate) fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Ensure the root ends with a slash so relative joins keep `/admin`.
fn normalize_base_url(raw: &Url) -> Url {
    let mut url = raw.clone();
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url
}
