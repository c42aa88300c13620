//! Live device data over the application websocket.
//!
//! [`Client::data_stream`] opens `/applications/{eui}/stream` and spawns a
//! worker task that owns the socket. The worker decodes each frame as an
//! envelope and hands `DeviceData` payloads to the consumer one at a time:
//! a payload counts as delivered only once [`DataReceiver::recv`] has taken
//! it. A payload nobody takes within [`HANDOFF_TIMEOUT`] is withdrawn and
//! the stream fails with [`StreamError::HandoffTimeout`]. A fatal condition
//! is reported on a separate error channel, after which the socket and both
//! channels are closed.
//!
//! There is no reconnect: once both channels are closed the stream is done
//! and a new one has to be opened.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut stream = client.data_stream(&app.eui).await?;
//! while let Some(msg) = stream.recv_data().await {
//!     println!("{} sent {:?}", msg.device_eui, msg.data());
//! }
//! if let Some(err) = stream.recv_error().await {
//!     eprintln!("stream ended: {err}");
//! }
//! ```

use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::applications::application_path;
use crate::client::Client;
use crate::error::{Error, StreamError};
use crate::models::DataMessage;
use crate::transport::TOKEN_HEADER;

/// How long the worker waits for the consumer to accept one message.
pub const HANDOFF_TIMEOUT: Duration = Duration::from_millis(400);

// ── DataStream ───────────────────────────────────────────────────────

/// A payload on offer; taking it answers `taken`.
#[derive(Debug)]
struct Delivery {
    msg: DataMessage,
    taken: oneshot::Sender<()>,
}

/// Data end of a stream. Each [`recv`](Self::recv) takes one payload from
/// the worker.
#[derive(Debug)]
pub struct DataReceiver {
    rx: mpsc::Receiver<Delivery>,
}

impl DataReceiver {
    /// Next device message, or `None` once the stream has stopped.
    ///
    /// Cancel safe: a payload is only taken when this returns it.
    pub async fn recv(&mut self) -> Option<DataMessage> {
        while let Some(Delivery { msg, taken }) = self.rx.recv().await {
            if taken.send(()).is_ok() {
                return Some(msg);
            }
            trace!(device = %msg.device_eui, "Skipping withdrawn data message");
        }
        None
    }
}

fn data_channel() -> (mpsc::Sender<Delivery>, DataReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (tx, DataReceiver { rx })
}

/// Consumer end of an application data stream.
///
/// Both channels close when the worker stops; seeing `None` from both is
/// the end-of-stream signal.
#[derive(Debug)]
pub struct DataStream {
    data: DataReceiver,
    error_rx: mpsc::Receiver<StreamError>,
}

impl DataStream {
    /// Next device message, or `None` once the stream has stopped.
    pub async fn recv_data(&mut self) -> Option<DataMessage> {
        self.data.recv().await
    }

    /// The error that stopped the stream, or `None` once it has stopped.
    pub async fn recv_error(&mut self) -> Option<StreamError> {
        self.error_rx.recv().await
    }

    /// Split into the data and error receivers for independent consumers.
    pub fn into_parts(self) -> (DataReceiver, mpsc::Receiver<StreamError>) {
        (self.data, self.error_rx)
    }
}

impl Client {
    /// Open the live data stream for an application.
    ///
    /// Returns once the websocket handshake has completed and the worker
    /// is running. `https` backends are reached over `wss`, plain `http`
    /// (local test servers) over `ws`. TLS verification and the connect
    /// deadline come from the client's [`TransportConfig`](crate::TransportConfig).
    pub async fn data_stream(&self, application_eui: &str) -> Result<DataStream, Error> {
        let url = stream_url(self.base_url(), application_eui)?;
        info!(url = %url, "Connecting to data stream");

        let uri: tungstenite::http::Uri = url
            .as_str()
            .parse()
            .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;
        let request =
            ClientRequestBuilder::new(uri).with_header(TOKEN_HEADER, self.token().expose_secret());

        let transport = self.transport();
        let connector = transport.websocket_connector()?;
        let connecting = tokio_tungstenite::connect_async_tls_with_config(
            request,
            None,
            false,
            Some(connector),
        );
        let (ws, _response) = tokio::time::timeout(transport.timeout, connecting)
            .await
            .map_err(|_| {
                Error::WebSocketConnect(format!(
                    "handshake timed out after {:?}",
                    transport.timeout
                ))
            })?
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        info!("Data stream connected");

        let (data_tx, data) = data_channel();
        let (error_tx, error_rx) = mpsc::channel(1);
        tokio::spawn(run_stream(ws, data_tx, error_tx));

        Ok(DataStream { data, error_rx })
    }
}

/// Websocket URL for an application's stream, keeping any base path.
pub(crate) fn stream_url(base: &Url, application_eui: &str) -> Result<Url, Error> {
    let scheme = match base.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(Error::WebSocketConnect(format!(
                "unsupported scheme '{other}' for data stream"
            )));
        }
    };

    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|()| Error::WebSocketConnect(format!("cannot use {scheme} with {base}")))?;
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}{}/stream", application_path(application_eui)));
    url.set_query(None);
    Ok(url)
}

// ── Worker ───────────────────────────────────────────────────────────

/// Why the read loop stopped.
#[derive(Debug, PartialEq)]
enum Termination {
    /// Reported to the consumer on the error channel.
    Failed(StreamError),
    /// The server sent an `Error` envelope.
    ErrorFrame(Option<String>),
    /// The data receiver was dropped.
    ConsumerGone,
}

/// Owns the socket until the stream ends, then tears everything down:
/// socket first, then the data channel, then the error channel.
async fn run_stream<S>(
    mut ws: S,
    data_tx: mpsc::Sender<Delivery>,
    error_tx: mpsc::Sender<StreamError>,
) where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Sink<Message> + Unpin,
{
    match read_loop(&mut ws, &data_tx).await {
        Termination::Failed(err) => {
            warn!(error = %err, "Data stream failed");
            notify(&error_tx, err).await;
        }
        Termination::ErrorFrame(message) => {
            warn!(
                reason = message.as_deref().unwrap_or(""),
                "Server reported a data stream error"
            );
        }
        Termination::ConsumerGone => debug!("Data stream consumer went away"),
    }

    if tokio::time::timeout(HANDOFF_TIMEOUT, ws.close()).await.is_err() {
        debug!("Timed out closing data stream socket");
    }
    drop(ws);
    drop(data_tx);
    drop(error_tx);
    debug!("Data stream closed");
}

/// Read frames until something ends the stream.
async fn read_loop<S>(ws: &mut S, data_tx: &mpsc::Sender<Delivery>) -> Termination
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let frame = match ws.next().await {
            Some(Ok(Message::Text(text))) => decode_frame(text.as_bytes()),
            Some(Ok(Message::Binary(bytes))) => decode_frame(&bytes),
            Some(Ok(Message::Close(frame))) => {
                if let Some(ref cf) = frame {
                    info!(code = %cf.code, reason = %cf.reason, "Data stream close frame received");
                }
                return Termination::Failed(StreamError::Closed);
            }
            Some(Ok(_)) => {
                // Ping, Pong, Frame; tungstenite answers pings itself
                continue;
            }
            Some(Err(e)) => return Termination::Failed(StreamError::Transport(e.to_string())),
            None => return Termination::Failed(StreamError::Closed),
        };

        match frame {
            Ok(Frame::DeviceData(msg)) => {
                if let Err(end) = hand_off(data_tx, *msg).await {
                    return end;
                }
            }
            Ok(Frame::Error(message)) => return Termination::ErrorFrame(message),
            Ok(Frame::Other(kind)) => trace!(kind = %kind, "Ignoring data stream frame"),
            Err(err) => return Termination::Failed(err),
        }
    }
}

/// Give one message to the consumer and wait at most [`HANDOFF_TIMEOUT`]
/// for it to be taken. On timeout the offer is withdrawn, so a late
/// `recv` skips it.
async fn hand_off(data_tx: &mpsc::Sender<Delivery>, msg: DataMessage) -> Result<(), Termination> {
    let (taken, mut accepted) = oneshot::channel();
    let offer = async {
        data_tx
            .send(Delivery { msg, taken })
            .await
            .map_err(|_| Termination::ConsumerGone)?;
        (&mut accepted).await.map_err(|_| Termination::ConsumerGone)
    };
    let outcome = tokio::time::timeout(HANDOFF_TIMEOUT, offer).await;

    match outcome {
        Ok(result) => result,
        Err(_) => {
            // Taken right at the deadline still counts.
            accepted.close();
            if accepted.try_recv().is_ok() {
                Ok(())
            } else {
                Err(Termination::Failed(StreamError::HandoffTimeout))
            }
        }
    }
}

/// Report the terminal error; bounded like a data handoff.
async fn notify(error_tx: &mpsc::Sender<StreamError>, err: StreamError) {
    match tokio::time::timeout(HANDOFF_TIMEOUT, error_tx.send(err)).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => debug!("No receiver for data stream error"),
        Err(_) => debug!("Timed out reporting data stream error"),
    }
}

// ── Envelope decoding ────────────────────────────────────────────────

/// Envelope the backend wraps every stream message in:
/// `{ "type": "DeviceData" | "Error" | ..., "message": "...", "data": {...} }`
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, PartialEq)]
enum Frame {
    DeviceData(Box<DataMessage>),
    Error(Option<String>),
    Other(String),
}

fn decode_frame(raw: &[u8]) -> Result<Frame, StreamError> {
    let envelope: Envelope =
        serde_json::from_slice(raw).map_err(|e| StreamError::Decode(e.to_string()))?;

    match envelope.kind.as_str() {
        "DeviceData" => serde_json::from_value(envelope.data)
            .map(|msg| Frame::DeviceData(Box::new(msg)))
            .map_err(|e| StreamError::Decode(format!("invalid DeviceData payload: {e}"))),
        "Error" => Ok(Frame::Error(envelope.message)),
        _ => Ok(Frame::Other(envelope.kind)),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
