//! Typed views over an output's open configuration mapping.
//!
//! The backend stores output configuration as a JSON object whose `"type"`
//! key selects the output kind. New kinds implement [`OutputConfig`]; the
//! output endpoints only ever see the materialized map.

use serde_json::{Map, Value};

/// Something that can be stored as an output configuration.
pub trait OutputConfig {
    /// Materialize the configuration, including its `"type"` key.
    fn to_config(&self) -> Map<String, Value>;
}

// ── Decode-with-default helpers ──────────────────────────────────────

/// String at `key`, or `default` when missing or not a string.
pub fn config_str(config: &Map<String, Value>, key: &str, default: &str) -> String {
    config
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_owned()
}

/// Bool at `key`, or `default` when missing or not a bool.
pub fn config_bool(config: &Map<String, Value>, key: &str, default: bool) -> bool {
    config.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Port-sized integer at `key`, or `default` when missing, not a number,
/// fractional, or out of range. Integral floats such as `1883.0` count.
pub fn config_u16(config: &Map<String, Value>, key: &str, default: u16) -> u16 {
    config.get(key).and_then(as_u16).unwrap_or(default)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_u16(value: &Value) -> Option<u16> {
    if let Some(n) = value.as_u64() {
        return u16::try_from(n).ok();
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&f)).then_some(f as u16)
}

// ── MQTT ─────────────────────────────────────────────────────────────

/// Discriminator value for MQTT outputs.
pub const MQTT_TYPE: &str = "mqtt";

const DEFAULT_MQTT_PORT: u16 = 1883;

/// Forward device data to an MQTT broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    /// Broker host name.
    pub endpoint: String,
    pub port: u16,
    pub tls: bool,
    pub certificate_check: bool,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub topic_name: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            port: DEFAULT_MQTT_PORT,
            tls: false,
            certificate_check: true,
            username: String::new(),
            password: String::new(),
            client_id: String::new(),
            topic_name: String::new(),
        }
    }
}

impl MqttConfig {
    /// Read an MQTT configuration, filling in defaults for missing keys.
    pub fn from_config(config: &Map<String, Value>) -> Self {
        Self {
            endpoint: config_str(config, "endpoint", ""),
            port: config_u16(config, "port", DEFAULT_MQTT_PORT),
            tls: config_bool(config, "tls", false),
            certificate_check: config_bool(config, "certCheck", true),
            username: config_str(config, "username", ""),
            password: config_str(config, "password", ""),
            client_id: config_str(config, "clientid", ""),
            topic_name: config_str(config, "topicName", ""),
        }
    }
}

impl OutputConfig for MqttConfig {
    fn to_config(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".into(), MQTT_TYPE.into());
        map.insert("endpoint".into(), self.endpoint.clone().into());
        map.insert("port".into(), self.port.into());
        map.insert("tls".into(), self.tls.into());
        map.insert("certCheck".into(), self.certificate_check.into());
        map.insert("username".into(), self.username.clone().into());
        map.insert("password".into(), self.password.clone().into());
        map.insert("clientid".into(), self.client_id.clone().into());
        map.insert("topicName".into(), self.topic_name.clone().into());
        map
    }
}

impl crate::models::Output {
    /// The configuration as MQTT settings, when this is an MQTT output.
    pub fn mqtt_config(&self) -> Option<MqttConfig> {
        (self.kind() == Some(MQTT_TYPE)).then(|| MqttConfig::from_config(&self.config))
    }

    /// Replace the configuration with `config`'s materialized map.
    pub fn set_config(&mut self, config: &impl OutputConfig) {
        self.config = config.to_config();
    }
}
