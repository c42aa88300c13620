use thiserror::Error;

/// Top-level error type for the `congress-api` crate.
///
/// Every REST operation returns this. Callers that only care about the
/// backend's verdict use [`status_code`](Error::status_code) and
/// [`message`](Error::message) instead of matching variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API token can't be carried in an HTTP header.
    #[error("API token contains characters not allowed in a header value")]
    InvalidToken,

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the raw response body.
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Validation ──────────────────────────────────────────────────
    /// Downstream port outside 1..=224, rejected before any request is sent.
    #[error("Invalid port number {0} (must be 1-224)")]
    InvalidPort(u8),

    /// A device or output that doesn't know its application, e.g. one
    /// deserialized by the caller instead of returned by a [`Client`](crate::Client) call.
    #[error("{kind} '{eui}' has no application EUI")]
    NoApplication { kind: &'static str, eui: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// The data stream websocket could not be opened.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),
}

const INVALID_PORT_MESSAGE: &str = "Invalid port number";

impl Error {
    /// HTTP status carried by this error, or `0` when there is none.
    ///
    /// Client-side port validation reports `400` so it reads the same as
    /// the backend's own bad-request answer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::InvalidPort(_) => 400,
            _ => 0,
        }
    }

    /// Backend message carried by this error, or `""` when there is none.
    pub fn message(&self) -> &str {
        match self {
            Self::Api { message, .. } => message,
            Self::InvalidPort(_) => INVALID_PORT_MESSAGE,
            _ => "",
        }
    }

    /// Returns `true` if the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}

/// Status code of an arbitrary error: `0` unless it is an [`Error`] with one.
pub fn error_status_code(err: &(dyn std::error::Error + 'static)) -> u16 {
    err.downcast_ref::<Error>().map_or(0, Error::status_code)
}

/// Message of an arbitrary error: `""` unless it is an [`Error`] with one.
pub fn error_message<'a>(err: &'a (dyn std::error::Error + 'static)) -> &'a str {
    err.downcast_ref::<Error>().map_or("", Error::message)
}

/// Terminal condition reported on a data stream's error channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A frame could not be decoded as a stream envelope.
    #[error("failed to decode stream frame: {0}")]
    Decode(String),

    /// The websocket failed while reading.
    #[error("websocket error: {0}")]
    Transport(String),

    /// The server closed the websocket or the stream ended.
    #[error("websocket closed by server")]
    Closed,

    /// The consumer did not take a message within the handoff window.
    #[error("timed out handing data to the consumer")]
    HandoffTimeout,
}
