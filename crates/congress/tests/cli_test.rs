//! Integration tests for the `congress` CLI binary.
//!
//! Argument parsing and error handling run without a backend; the rest
//! talk to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "cli-token";
const APP: &str = "00-09-09-00-00-00-00-01";
const DEV: &str = "00-09-09-00-00-00-01-01";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `congress` binary with env isolation.
///
/// Clears all `CONGRESS_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn congress_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("congress");
    cmd.env("HOME", "/tmp/congress-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/congress-cli-test-nonexistent")
        .env_remove("CONGRESS_ADDR")
        .env_remove("CONGRESS_TOKEN")
        .env_remove("CONGRESS_TIMEOUT")
        .env_remove("CONGRESS_INSECURE")
        .env_remove("CONGRESS_CA_CERT")
        .env_remove("RUST_LOG");
    cmd
}

/// A command pointed at `server` with a token.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = congress_cmd();
    cmd.args(["--addr", &server.uri(), "--token", TOKEN]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = congress_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    congress_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("apps")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("gateways"))
            .and(predicate::str::contains("outputs"))
            .and(predicate::str::contains("stream")),
    );
}

#[test]
fn test_version_flag() {
    congress_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("congress"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = congress_cmd().arg("foobar").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("foobar"));
}

#[test]
fn test_missing_token_exits_with_auth_code() {
    congress_cmd()
        .args(["apps", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No API token"));
}

#[test]
fn test_bad_address_is_a_usage_error() {
    congress_cmd()
        .args(["--addr", "not a url", "--token", TOKEN, "ping"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("addr"));
}

#[test]
fn test_unreachable_backend_exits_with_connection_code() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    congress_cmd()
        .args(["--addr", &format!("http://127.0.0.1:{port}"), "--token", TOKEN])
        .args(["--timeout", "5", "ping"])
        .assert()
        .code(7);
}

#[test]
fn test_device_port_is_parsed_as_a_byte() {
    congress_cmd()
        .args(["--token", TOKEN, "devices", "send", APP, DEV, "01", "--port", "300"])
        .assert()
        .code(2);
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_ping_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("X-API-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .arg("ping")
        .assert()
        .success()
        .stderr(predicate::str::contains("reachable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_from_environment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/applications"))
        .and(header("X-API-Token", "env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applications": [{ "applicationEUI": APP, "tags": { "name": "Field trial" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    congress_cmd()
        .env("CONGRESS_ADDR", server.uri())
        .env("CONGRESS_TOKEN", "env-token")
        .args(["apps", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(APP).and(predicate::str::contains("Field trial")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_application_exits_with_not_found_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/applications/{APP}")))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown application"))
        .mount(&server)
        .await;

    against(&server)
        .args(["apps", "get", APP])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("unknown application"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_tag_is_rejected_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/applications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "applicationEUI": APP })))
        .expect(0)
        .mount(&server)
        .await;

    against(&server)
        .args(["apps", "create", "--tag", "name=<script>"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tag"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_rejects_port_zero_without_enqueueing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/applications/{APP}/devices/{DEV}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deviceEUI": DEV,
            "deviceType": "OTAA"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/applications/{APP}/devices/{DEV}/message")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    against(&server)
        .args(["devices", "send", APP, DEV, "0102", "--port", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("port"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_enqueues_hex_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/applications/{APP}/devices/{DEV}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deviceEUI": DEV,
            "deviceType": "OTAA"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/applications/{APP}/devices/{DEV}/message")))
        .and(body_partial_json(json!({ "data": "0102ff", "port": 42, "ack": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": "0102ff",
            "port": 42,
            "ack": true,
            "state": "pending"
        })))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["devices", "send", APP, DEV, "0102FF", "--port", "42", "--ack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pending"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_gateway_with_position() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gateways"))
        .and(body_partial_json(json!({
            "gatewayEUI": "01-02-03-04-05-06-07-08",
            "ip": "10.0.0.1",
            "strictIP": true,
            "latitude": 63.4,
            "longitude": -10.5,
            "altitude": 12.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "gatewayEUI": "01-02-03-04-05-06-07-08",
            "ip": "10.0.0.1",
            "strictIP": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["gateways", "create", "01-02-03-04-05-06-07-08", "10.0.0.1", "--strict-ip"])
        .args(["--latitude", "63.4", "--longitude", "-10.5", "--altitude", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_mqtt_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/applications/{APP}/outputs")))
        .and(body_partial_json(json!({
            "config": {
                "type": "mqtt",
                "endpoint": "broker.local",
                "port": 8883,
                "tls": true,
                "certCheck": true,
                "topicName": "sensors"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "eui": "out-1",
            "appEUI": APP,
            "config": { "type": "mqtt", "endpoint": "broker.local" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["outputs", "create-mqtt", APP, "--endpoint", "broker.local"])
        .args(["--port", "8883", "--tls", "--topic", "sensors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("out-1"));
}
