#![allow(clippy::unwrap_used)]
// Data stream tests against a local websocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http;
use url::Url;

use congress_api::{Client, ClientConfig, Error, StreamError, TOKEN_HEADER};

const TOKEN: &str = "stream-token";
const APP: &str = "00-09-09-00-00-00-00-01";

// ── Helpers ─────────────────────────────────────────────────────────

/// What the server saw during the handshake.
#[derive(Debug)]
struct Handshake {
    path: String,
    token: String,
}

/// Accept one websocket connection, push `frames`, then keep the socket
/// open until the client goes away.
async fn serve(frames: Vec<Message>) -> (Client, oneshot::Receiver<Handshake>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let token = req
                .headers()
                .get(TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            let _ = seen_tx.send(Handshake {
                path: req.uri().path().to_owned(),
                token,
            });
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(tcp, callback)
            .await
            .unwrap();

        for frame in frames {
            if ws.send(frame).await.is_err() {
                return;
            }
        }
        while let Some(Ok(_)) = ws.next().await {}
    });

    (client_for(&format!("http://{addr}")), seen_rx)
}

fn client_for(uri: &str) -> Client {
    let config =
        ClientConfig::with_addr(Url::parse(uri).unwrap(), SecretString::from(TOKEN.to_owned()));
    Client::new(config).unwrap()
}

fn device_data(device_eui: &str) -> Message {
    Message::text(
        json!({
            "type": "DeviceData",
            "data": {
                "devAddr": "01020304",
                "timestamp": 1_500_000_000_000_i64,
                "data": "0102",
                "appEUI": APP,
                "deviceEUI": device_eui,
                "rssi": -90,
                "snr": 3.0,
                "frequency": 868.5,
                "gatewayEUI": "gw-1",
                "dataRate": "SF9BW125"
            }
        })
        .to_string(),
    )
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stream_delivers_device_data_in_order() {
    let (client, seen) = serve(vec![
        Message::text(json!({ "type": "KeepAlive" }).to_string()),
        device_data("dev-1"),
        device_data("dev-2"),
    ])
    .await;

    let mut stream = client.data_stream(APP).await.unwrap();

    let handshake = seen.await.unwrap();
    assert_eq!(handshake.token, TOKEN);
    assert_eq!(handshake.path, format!("/applications/{APP}/stream"));

    let first = stream.recv_data().await.unwrap();
    assert_eq!(first.device_eui, "dev-1");
    assert_eq!(first.data(), Some(vec![1, 2]));
    assert_eq!(stream.recv_data().await.unwrap().device_eui, "dev-2");
}

#[tokio::test]
async fn test_idle_stream_times_out_instead_of_closing() {
    let (client, _seen) = serve(Vec::new()).await;
    let mut stream = client.data_stream(APP).await.unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(700), stream.recv_data()).await;
    assert!(waited.is_err(), "stream ended early: {waited:?}");
}

#[tokio::test]
async fn test_error_frame_closes_both_channels_silently() {
    let (client, _seen) = serve(vec![
        device_data("dev-1"),
        Message::text(json!({ "type": "Error", "message": "application removed" }).to_string()),
    ])
    .await;
    let mut stream = client.data_stream(APP).await.unwrap();

    assert_eq!(stream.recv_data().await.unwrap().device_eui, "dev-1");
    assert!(stream.recv_data().await.is_none());
    assert_eq!(stream.recv_error().await, None);
}

#[tokio::test]
async fn test_malformed_frame_is_reported_then_stream_closes() {
    let (client, _seen) = serve(vec![Message::text("{not json")]).await;
    let mut stream = client.data_stream(APP).await.unwrap();

    let err = stream.recv_error().await.unwrap();
    assert!(matches!(err, StreamError::Decode(_)), "got: {err:?}");
    assert!(stream.recv_data().await.is_none());
    assert_eq!(stream.recv_error().await, None);
}

#[tokio::test]
async fn test_server_close_is_reported() {
    let (client, _seen) = serve(vec![Message::Close(None)]).await;
    let (mut data_rx, mut error_rx) = client.data_stream(APP).await.unwrap().into_parts();

    assert_eq!(error_rx.recv().await, Some(StreamError::Closed));
    assert!(data_rx.recv().await.is_none());
}

#[tokio::test]
async fn test_unread_payload_gets_handoff_timeout() {
    let (client, _seen) = serve(vec![device_data("dev-1")]).await;
    let mut stream = client.data_stream(APP).await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;

    let err = tokio::time::timeout(Duration::from_secs(1), stream.recv_error())
        .await
        .expect("worker should have reported the handoff timeout");
    assert_eq!(err, Some(StreamError::HandoffTimeout));
    assert!(
        stream.recv_data().await.is_none(),
        "the withdrawn payload must not be readable"
    );
}

#[tokio::test]
async fn test_consumer_within_deadline_gets_every_message() {
    let (client, _seen) = serve(vec![device_data("dev-1"), device_data("dev-2")]).await;
    let mut stream = client.data_stream(APP).await.unwrap();

    for expected in ["dev-1", "dev-2"] {
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(stream.recv_data().await.unwrap().device_eui, expected);
    }
}

#[tokio::test]
async fn test_rejected_handshake_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let reject = |_: &Request, _: Response| -> Result<Response, ErrorResponse> {
            Err(http::Response::builder()
                .status(http::StatusCode::UNAUTHORIZED)
                .body(Some("invalid token".to_owned()))
                .unwrap())
        };
        let _ = tokio_tungstenite::accept_hdr_async(tcp, reject).await;
    });

    let client = client_for(&format!("http://{addr}"));
    let err = client.data_stream(APP).await.unwrap_err();
    assert!(matches!(err, Error::WebSocketConnect(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_stalled_handshake_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept the TCP connection but never answer the upgrade request.
    tokio::spawn(async move {
        let (_tcp, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let mut config = ClientConfig::with_addr(
        Url::parse(&format!("http://{addr}")).unwrap(),
        SecretString::from(TOKEN.to_owned()),
    );
    config.transport.timeout = Duration::from_millis(300);
    let client = Client::new(config).unwrap();

    let started = std::time::Instant::now();
    let err = client.data_stream(APP).await.unwrap_err();

    assert!(matches!(err, Error::WebSocketConnect(ref m) if m.contains("timed out")), "got: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}
