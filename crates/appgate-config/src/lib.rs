//! Layered configuration for the Appgate reconciler.
//!
//! Settings come from built-in defaults, then `APPGATE_*` environment
//! variables, then a TOML file. The result is translated into an
//! `appgate_core::ProviderConfig`; nothing downstream reads the environment.

mod logging;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use appgate_core::ProviderConfig;

pub use logging::init_tracing;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tracing setup failed: {0}")]
    Logging(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Everything needed to connect one provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Admin API root, e.g. `https://controller.example.com:8443/admin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password. Prefer `APPGATE_PASSWORD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Identity provider to log in through.
    pub provider: String,

    pub insecure: bool,

    /// PEM bundle used when `insecure` is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Trace HTTP bodies.
    pub debug: bool,

    pub client_version: u32,

    /// Per-request timeout in seconds.
    pub timeout: u64,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            provider: "local".into(),
            insecure: true,
            ca_cert: None,
            debug: false,
            client_version: 14,
            timeout: 20,
            json_logs: false,
        }
    }
}

impl Settings {
    /// Validate and translate into the engine's connection config.
    pub fn to_provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        let raw = self
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigError::Validation {
                field: "url".into(),
                reason: "no controller address configured (set APPGATE_ADDRESS)".into(),
            })?;
        let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;

        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least one second".into(),
            });
        }

        let mut cfg = ProviderConfig::new(url).with_login(
            self.username.clone().unwrap_or_default(),
            SecretString::from(self.password.clone().unwrap_or_default()),
        );
        cfg.provider.clone_from(&self.provider);
        cfg.insecure = self.insecure;
        cfg.ca_cert.clone_from(&self.ca_cert);
        cfg.debug = self.debug;
        cfg.client_version = self.client_version;
        cfg.timeout = Duration::from_secs(self.timeout);
        Ok(cfg)
    }

    /// Install the tracing subscriber these settings ask for.
    pub fn init_tracing(&self) -> Result<(), ConfigError> {
        init_tracing(self.debug, self.json_logs)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "appgate", "appgate").map_or_else(
        || PathBuf::from(".appgate").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// The provider chain for `path`: defaults, then environment, then file.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Env::prefixed("APPGATE_").map(|key| {
            if key.as_str().eq_ignore_ascii_case("address") {
                "url".into()
            } else if key.as_str().eq_ignore_ascii_case("http_debug") {
                "debug".into()
            } else {
                key.as_str().to_owned().into()
            }
        }))
        .merge(Toml::file(path))
}

/// Load settings using the canonical config path.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&config_path())
}

/// Load settings with an explicit file. A missing file is not an error.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    Ok(figment(path).extract()?)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize settings to TOML at the canonical config path.
pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    save_settings_to(settings, &config_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(settings)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
