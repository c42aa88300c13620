//! Shared configuration for Congress tools.
//!
//! Settings come from built-in defaults, an optional TOML file and
//! `CONGRESS_*` environment variables, in that order of precedence.
//! [`resolve_client_config`] layers explicit caller values on top and
//! produces a `congress_api::ClientConfig`.

use std::fmt;
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

use congress_api::{ClientConfig, DEFAULT_ADDR, TlsMode, TransportConfig};

/// Prefix for environment variables, e.g. `CONGRESS_ADDR`.
pub const ENV_PREFIX: &str = "CONGRESS_";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured (set CONGRESS_TOKEN or pass --token)")]
    NoToken,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Merged settings from defaults, config file and environment.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Backend base URL.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// API token. Prefer `CONGRESS_TOKEN` over storing it in the file.
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Skip certificate verification.
    #[serde(default)]
    pub insecure: bool,

    /// Extra CA certificate (PEM) to trust.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            token: None,
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("addr", &self.addr)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("insecure", &self.insecure)
            .field("ca_cert", &self.ca_cert)
            .finish()
    }
}

fn default_addr() -> String {
    DEFAULT_ADDR.into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "telenor", "congress").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("congress");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load settings from the default config file and the environment.
/// A missing file is not an error.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&config_path())
}

/// Load settings using `path` as the config file.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    Ok(figment(path).extract()?)
}

// ── Resolution ──────────────────────────────────────────────────────

/// Values given explicitly by the caller (e.g. command-line flags).
/// Anything set here wins over [`Settings`].
#[derive(Debug, Default)]
pub struct Overrides {
    pub addr: Option<String>,
    pub token: Option<SecretString>,
    pub timeout: Option<u64>,
    pub insecure: bool,
}

/// Build a `ClientConfig`: explicit values first, settings second.
pub fn resolve_client_config(
    settings: &Settings,
    overrides: Overrides,
) -> Result<ClientConfig, ConfigError> {
    let addr_str = overrides.addr.as_deref().unwrap_or(&settings.addr);
    let addr = url::Url::parse(addr_str).map_err(|e| ConfigError::Validation {
        field: "addr".into(),
        reason: format!("invalid URL '{addr_str}': {e}"),
    })?;

    let token = overrides
        .token
        .or_else(|| {
            settings
                .token
                .as_ref()
                .filter(|t| !t.is_empty())
                .map(|t| SecretString::from(t.clone()))
        })
        .ok_or(ConfigError::NoToken)?;

    let tls = if overrides.insecure || settings.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = settings.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(overrides.timeout.unwrap_or(settings.timeout));

    let mut config = ClientConfig::with_addr(addr, token);
    config.transport = TransportConfig { tls, timeout };
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let settings: Settings = figment(Path::new("missing.toml")).extract()?;
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.addr, "https://api.lora.telenor.io");
            assert_eq!(settings.timeout, 30);
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    addr = "http://localhost:8080"
                    token = "from-file"
                    timeout = 5
                "#,
            )?;
            let settings: Settings = figment(Path::new("config.toml")).extract()?;
            assert_eq!(settings.addr, "http://localhost:8080");
            assert_eq!(settings.token.as_deref(), Some("from-file"));
            assert_eq!(settings.timeout, 5);
            assert!(!settings.insecure);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    addr = "http://localhost:8080"
                    token = "from-file"
                "#,
            )?;
            jail.set_env("CONGRESS_TOKEN", "from-env");
            jail.set_env("CONGRESS_ADDR", "https://staging.example.com");
            jail.set_env("CONGRESS_CA_CERT", "/etc/ca.pem");

            let settings: Settings = figment(Path::new("config.toml")).extract()?;
            assert_eq!(settings.addr, "https://staging.example.com");
            assert_eq!(settings.token.as_deref(), Some("from-env"));
            assert_eq!(settings.ca_cert, Some(PathBuf::from("/etc/ca.pem")));
            Ok(())
        });
    }

    #[test]
    fn debug_redacts_token() {
        let settings = Settings {
            token: Some("super-secret".into()),
            ..Settings::default()
        };
        let shown = format!("{settings:?}");
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("REDACTED"));
    }

    #[test]
    fn explicit_values_win_over_settings() {
        let settings = Settings {
            token: Some("from-settings".into()),
            ..Settings::default()
        };
        let config = resolve_client_config(
            &settings,
            Overrides {
                addr: Some("http://127.0.0.1:9000".into()),
                token: Some(SecretString::from("explicit".to_owned())),
                timeout: Some(3),
                insecure: true,
            },
        )
        .unwrap();

        assert_eq!(config.addr.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.token.expose_secret(), "explicit");
        assert_eq!(config.transport.timeout, Duration::from_secs(3));
        assert_eq!(config.transport.tls, TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn settings_fill_in_missing_values() {
        let settings = Settings {
            token: Some("from-settings".into()),
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            ..Settings::default()
        };
        let config = resolve_client_config(&settings, Overrides::default()).unwrap();

        assert_eq!(config.addr.as_str(), "https://api.lora.telenor.io/");
        assert_eq!(config.token.expose_secret(), "from-settings");
        assert_eq!(config.transport.timeout, Duration::from_secs(30));
        assert_eq!(
            config.transport.tls,
            TlsMode::CustomCa(PathBuf::from("/etc/ca.pem"))
        );
    }

    #[test]
    fn missing_or_empty_token_is_an_error() {
        let err = resolve_client_config(&Settings::default(), Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoToken));

        let empty = Settings {
            token: Some(String::new()),
            ..Settings::default()
        };
        let err = resolve_client_config(&empty, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoToken));
    }

    #[test]
    fn bad_address_is_a_validation_error() {
        let settings = Settings {
            addr: "not a url".into(),
            token: Some("t".into()),
            ..Settings::default()
        };
        let err = resolve_client_config(&settings, Overrides::default()).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "addr"),
            "got: {err:?}"
        );
    }
}
