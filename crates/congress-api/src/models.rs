// Congress entity and message types
//
// Field names follow the backend's camelCase JSON. Most fields use
// `#[serde(default)]` because the backend omits zero values.

use serde::{Deserialize, Serialize};

use crate::tags::{Tagged, Tags};

// ── Application ──────────────────────────────────────────────────────

/// A group of related devices. The EUI is assigned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(
        rename = "applicationEUI",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub eui: String,
    #[serde(default)]
    pub tags: Tags,
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tagged for Application {
    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// How a device obtains its session keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    /// Over-The-Air Activation: session keys are negotiated by a join
    /// procedure and only the application key is provisioned.
    #[default]
    #[serde(rename = "OTAA")]
    Otaa,
    /// Activation By Personalization: session keys and device address are
    /// provisioned in advance.
    #[serde(rename = "ABP")]
    Abp,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Otaa => "OTAA",
            Self::Abp => "ABP",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OTAA" => Ok(Self::Otaa),
            "ABP" => Ok(Self::Abp),
            other => Err(format!("unknown device type '{other}', expected OTAA or ABP")),
        }
    }
}

/// A LoRa device. Always belongs to exactly one application.
///
/// The device type is fixed when the device is created, so it is only
/// readable through [`device_type`](Self::device_type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "deviceEUI", default)]
    pub eui: String,
    #[serde(rename = "devAddr", default)]
    pub device_address: String,
    #[serde(rename = "appKey", default)]
    pub application_key: String,
    #[serde(rename = "appSKey", default)]
    pub application_session_key: String,
    #[serde(rename = "nwkSKey", default)]
    pub network_session_key: String,
    #[serde(rename = "fCntUp", default)]
    pub frame_counter_up: u16,
    #[serde(rename = "fCntDn", default)]
    pub frame_counter_down: u16,
    #[serde(rename = "relaxedCounter", default)]
    pub relaxed_counter: bool,
    #[serde(rename = "deviceType", default)]
    device_type: DeviceType,
    #[serde(rename = "keyWarning", default)]
    pub key_warning: bool,
    #[serde(default)]
    pub tags: Tags,
    /// Owning application, taken from the request path.
    #[serde(skip)]
    pub(crate) application_eui: String,
}

impl Device {
    /// Request body for a new device; the backend fills in keys and EUI.
    pub(crate) fn new(application_eui: &str, device_type: DeviceType) -> Self {
        Self {
            eui: String::new(),
            device_address: String::new(),
            application_key: String::new(),
            application_session_key: String::new(),
            network_session_key: String::new(),
            frame_counter_up: 0,
            frame_counter_down: 0,
            relaxed_counter: false,
            device_type,
            key_warning: false,
            tags: Tags::new(),
            application_eui: application_eui.to_owned(),
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// EUI of the application this device belongs to.
    pub fn application_eui(&self) -> &str {
        &self.application_eui
    }

    pub(crate) fn in_application(mut self, application_eui: &str) -> Self {
        application_eui.clone_into(&mut self.application_eui);
        self
    }
}

impl Tagged for Device {
    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }
}

// ── Gateway ──────────────────────────────────────────────────────────

/// Geographic position of a gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// A gateway forwarding radio packets to the backend. The EUI is chosen
/// by the caller when the gateway is registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    #[serde(rename = "gatewayEUI", default, skip_serializing_if = "String::is_empty")]
    pub eui: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,
    #[serde(rename = "strictIP", default)]
    pub strict_ip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub tags: Tags,
}

impl Gateway {
    /// Position when both latitude and longitude are known. A missing
    /// altitude reads as sea level.
    pub fn position(&self) -> Option<Position> {
        Some(Position {
            latitude: self.latitude?,
            longitude: self.longitude?,
            altitude: self.altitude.unwrap_or_default(),
        })
    }

    pub fn set_position(&mut self, position: Option<Position>) {
        self.latitude = position.map(|p| p.latitude);
        self.longitude = position.map(|p| p.longitude);
        self.altitude = position.map(|p| p.altitude);
    }
}

impl Tagged for Gateway {
    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }
}

// ── Output ───────────────────────────────────────────────────────────

/// An application output forwarding device data elsewhere (e.g. MQTT).
///
/// `config` is an open mapping tagged by its `"type"` key; see
/// [`OutputConfig`](crate::OutputConfig) for typed views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub eui: String,
    #[serde(rename = "appEUI", default, skip_serializing_if = "String::is_empty")]
    pub application_eui: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub config: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "logs", default, skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<OutputLog>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

impl Output {
    /// The `"type"` discriminator of the configuration, if any.
    pub fn kind(&self) -> Option<&str> {
        self.config.get("type").and_then(serde_json::Value::as_str)
    }
}

/// One log line reported by an output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLog {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub message: String,
}

// ── Messages ─────────────────────────────────────────────────────────

/// Decode a hex payload; `None` when the text is not valid hex.
fn decode_hex(text: &str) -> Option<Vec<u8>> {
    hex::decode(text).ok()
}

/// A message queued for delivery to a device. It goes out the next time
/// the device sends an upstream packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownstreamMessage {
    /// Hex-encoded payload.
    #[serde(rename = "data", default)]
    pub hex_data: String,
    #[serde(default)]
    pub port: u8,
    #[serde(default)]
    pub ack: bool,
    #[serde(default)]
    pub sent_time: i64,
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub ack_time: i64,
    #[serde(default)]
    pub state: String,
}

impl DownstreamMessage {
    pub(crate) fn new(data: &[u8], port: u8, ack: bool) -> Self {
        Self {
            hex_data: hex::encode(data),
            port,
            ack,
            ..Self::default()
        }
    }

    /// Payload bytes, or `None` if the backend sent invalid hex.
    pub fn data(&self) -> Option<Vec<u8>> {
        decode_hex(&self.hex_data)
    }
}

/// Telemetry sent by a device, as delivered on the data stream and by the
/// device message history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMessage {
    #[serde(rename = "devAddr", default)]
    pub device_address: String,
    #[serde(default)]
    pub timestamp: i64,
    /// Hex-encoded payload.
    #[serde(rename = "data", default)]
    pub hex_data: String,
    #[serde(rename = "appEUI", default)]
    pub application_eui: String,
    #[serde(rename = "deviceEUI", default)]
    pub device_eui: String,
    #[serde(default)]
    pub rssi: i32,
    #[serde(default)]
    pub snr: f32,
    #[serde(default)]
    pub frequency: f32,
    #[serde(rename = "gatewayEUI", default)]
    pub gateway_eui: String,
    #[serde(rename = "dataRate", default)]
    pub data_rate: String,
}

impl DataMessage {
    /// Payload bytes, or `None` if the text is not valid hex.
    pub fn data(&self) -> Option<Vec<u8>> {
        decode_hex(&self.hex_data)
    }
}

/// An upstream message from a device's history; same shape as [`DataMessage`].
pub type UpstreamMessage = DataMessage;

// ── List envelopes ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationList {
    #[serde(default)]
    pub applications: Vec<Application>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GatewayList {
    #[serde(default)]
    pub gateways: Vec<Gateway>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputList {
    #[serde(default)]
    pub outputs: Vec<Output>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    #[serde(default)]
    pub messages: Vec<UpstreamMessage>,
}
