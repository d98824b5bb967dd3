use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Identity provider used when none is configured.
pub const DEFAULT_IDENTITY_PROVIDER: &str = "local";

/// Everything needed to open a session against one controller.
///
/// Supplied once at process start and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Admin API root, e.g. `https://controller.example.com:8443/admin`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Name of the identity provider the admin user lives in.
    pub identity_provider: String,
    /// Accept self-signed controller certificates.
    pub insecure: bool,
    /// Trace request and response bodies.
    pub debug: bool,
}

impl Credentials {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            identity_provider: DEFAULT_IDENTITY_PROVIDER.into(),
            insecure: true,
            debug: false,
        }
    }

    /// Both username and password are present.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.expose_secret().is_empty()
    }
}

/// `POST /login` body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub provider_name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub device_id: Uuid,
}

/// `POST /login` response. Only the fields the session keeps.
#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

/// Bearer token bound into an authenticated session.
#[derive(Debug, Clone)]
pub struct Token {
    value: SecretString,
    expires: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(value: SecretString, expires: Option<DateTime<Utc>>) -> Self {
        Self { value, expires }
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// A token without an expiry never counts as expired locally; the
    /// controller still answers 401 once it has dropped it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    pub(crate) fn expose(&self) -> &str {
        self.value.expose_secret()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn url() -> Url {
        Url::parse("https://controller.test:8443/admin").unwrap()
    }

    #[test]
    fn credentials_require_both_fields() {
        let full = Credentials::new(url(), "admin", SecretString::from("s3cret".to_owned()));
        assert!(full.is_complete());
        assert_eq!(full.identity_provider, "local");

        let no_password = Credentials::new(url(), "admin", SecretString::from(String::new()));
        assert!(!no_password.is_complete());

        let no_user = Credentials::new(url(), "", SecretString::from("s3cret".to_owned()));
        assert!(!no_user.is_complete());
    }

    #[test]
    fn token_expiry() {
        let now = Utc::now();
        let past = Token::new(SecretString::from("t".to_owned()), Some(now - Duration::minutes(1)));
        let future = Token::new(SecretString::from("t".to_owned()), Some(now + Duration::hours(1)));
        let open = Token::new(SecretString::from("t".to_owned()), None);

        assert!(past.is_expired_at(now));
        assert!(!future.is_expired_at(now));
        assert!(!open.is_expired_at(now));
    }

    #[test]
    fn login_request_uses_camel_case() {
        let body = serde_json::to_value(LoginRequest {
            provider_name: "local",
            username: "admin",
            password: "pw",
            device_id: Uuid::nil(),
        })
        .unwrap();
        assert_eq!(body["providerName"], "local");
        assert_eq!(body["deviceId"], "00000000-0000-0000-0000-000000000000");
    }
}
