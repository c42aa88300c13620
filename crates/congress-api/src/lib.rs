// congress-api: Async Rust client for the Congress LoRa device-management API

pub mod applications;
pub mod client;
pub mod devices;
pub mod error;
pub mod gateways;
pub mod models;
pub mod output_config;
pub mod outputs;
pub mod stream;
pub mod tags;
pub mod transport;

pub use client::{Client, ClientConfig, DEFAULT_ADDR};
pub use devices::DOWNSTREAM_PORTS;
pub use error::{Error, StreamError, error_message, error_status_code};
pub use models::{
    Application, DataMessage, Device, DeviceType, DownstreamMessage, Gateway, Output, OutputLog,
    Position, UpstreamMessage,
};
pub use output_config::{MqttConfig, OutputConfig};
pub use stream::{DataReceiver, DataStream, HANDOFF_TIMEOUT};
pub use tags::{Tagged, Tags};
pub use transport::{TOKEN_HEADER, TlsMode, TransportConfig};
