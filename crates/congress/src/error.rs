//! CLI error types with miette diagnostics.
//!
//! Maps library and config errors into user-facing errors with help text
//! and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use congress_api::StreamError;
use congress_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(congress::connection_failed),
        help(
            "Check the address and your network connection.\n\
             Reason: {reason}\n\
             The address can be set with --addr or CONGRESS_ADDR."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(congress::tls_error),
        help("Check ca_cert in your config file, or use --insecure (-k) against a test backend.")
    )]
    Tls { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("No API token configured")]
    #[diagnostic(
        code(congress::no_token),
        help("Pass --token, set CONGRESS_TOKEN, or add `token = \"...\"` to {path}")
    )]
    NoToken { path: String },

    #[error("The backend rejected the API token ({status})")]
    #[diagnostic(
        code(congress::auth_failed),
        help("Check that the token is valid and has not been revoked.\n{message}")
    )]
    AuthFailed { status: u16, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(congress::not_found))]
    NotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(congress::api_error))]
    Api { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(congress::bad_response))]
    BadResponse { message: String },

    #[error("Data stream stopped: {0}")]
    #[diagnostic(code(congress::stream))]
    Stream(#[from] StreamError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(congress::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Could not load configuration: {message}")]
    #[diagnostic(code(congress::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(congress::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::NoToken { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── congress_api::Error → CliError mapping ───────────────────────────

impl From<congress_api::Error> for CliError {
    fn from(err: congress_api::Error) -> Self {
        use congress_api::Error;

        match err {
            Error::Transport(e) if e.is_connect() || e.is_timeout() => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                reason: e.to_string(),
            },
            Error::WebSocketConnect(reason) => Self::ConnectionFailed {
                url: "data stream".into(),
                reason,
            },
            Error::Tls(reason) => Self::Tls { reason },
            Error::InvalidPort(port) => Self::Validation {
                field: "port".into(),
                reason: format!("{port} is outside 1-224"),
            },
            Error::NoApplication { kind, eui } => Self::Validation {
                field: "application".into(),
                reason: format!("{kind} {eui} has no application EUI"),
            },
            Error::InvalidToken => Self::Validation {
                field: "token".into(),
                reason: "contains characters not allowed in a header".into(),
            },
            Error::Api { status: 404, message } => Self::NotFound { message },
            Error::Api {
                status: status @ (401 | 403),
                message,
            } => Self::AuthFailed { status, message },
            Error::Api { status, message } => Self::Api { status, message },
            Error::Deserialization { message, .. } => Self::BadResponse { message },
            other => Self::BadResponse {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoToken => Self::NoToken {
                path: congress_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(e) => Self::Config {
                message: e.to_string(),
            },
        }
    }
}
