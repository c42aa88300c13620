//! Clap derive structures for the `congress` CLI.

use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

use congress_api::DeviceType;
use congress_config::Overrides;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// congress -- manage LoRa applications, devices and gateways
#[derive(Debug, Parser)]
#[command(
    name = "congress",
    version,
    about = "Manage Congress LoRa applications, devices and gateways from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend address (default https://api.lora.telenor.io)
    #[arg(long, short = 'a', env = "CONGRESS_ADDR", global = true)]
    pub addr: Option<String>,

    /// API token
    #[arg(long, env = "CONGRESS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "CONGRESS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Flag values that take precedence over the loaded settings.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            addr: self.addr.clone(),
            token: self.token.clone().map(SecretString::from),
            timeout: self.timeout,
            insecure: self.insecure,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the backend answers and the token is accepted
    Ping,

    /// Manage applications
    #[command(alias = "app", alias = "a")]
    Apps(AppsArgs),

    /// Manage devices and their messages
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage gateways
    #[command(alias = "gw", alias = "g")]
    Gateways(GatewaysArgs),

    /// Manage application outputs
    #[command(alias = "out", alias = "o")]
    Outputs(OutputsArgs),

    /// Follow live device data for an application
    Stream {
        /// Application EUI
        app: String,

        /// Stop after this many messages
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },
}

// ── Applications ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppsCommand {
    /// List applications
    #[command(alias = "ls")]
    List,

    /// Show one application
    Get {
        /// Application EUI
        eui: String,
    },

    /// Create an application
    Create {
        /// Tag to set, as KEY=VALUE (repeatable)
        #[arg(long = "tag", short = 't', value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },

    /// Delete an application
    #[command(alias = "rm")]
    Delete {
        /// Application EUI
        eui: String,
    },

    /// Set a tag on an application
    Tag {
        /// Application EUI
        eui: String,
        key: String,
        value: String,
    },
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List the devices of an application
    #[command(alias = "ls")]
    List {
        /// Application EUI
        app: String,
    },

    /// Show one device
    Get {
        /// Application EUI
        app: String,
        /// Device EUI
        eui: String,
    },

    /// Create a device
    Create {
        /// Application EUI
        app: String,

        /// Activation type (otaa or abp)
        #[arg(long = "type", default_value = "otaa")]
        device_type: DeviceType,

        /// Tag to set, as KEY=VALUE (repeatable)
        #[arg(long = "tag", short = 't', value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Application EUI
        app: String,
        /// Device EUI
        eui: String,
    },

    /// Queue a downstream message
    Send {
        /// Application EUI
        app: String,
        /// Device EUI
        eui: String,

        /// Payload as hex, e.g. 0102ff
        data: String,

        /// LoRaWAN port (1-224)
        #[arg(long, short = 'p', default_value_t = 1)]
        port: u8,

        /// Request an acknowledgement from the device
        #[arg(long)]
        ack: bool,
    },

    /// Show the queued downstream message
    Queued {
        /// Application EUI
        app: String,
        /// Device EUI
        eui: String,
    },

    /// Drop the queued downstream message
    Clear {
        /// Application EUI
        app: String,
        /// Device EUI
        eui: String,
    },

    /// Show recent upstream messages
    Messages {
        /// Application EUI
        app: String,
        /// Device EUI
        eui: String,

        /// Maximum number of messages
        #[arg(long, short = 'l', default_value_t = 60)]
        limit: u32,
    },
}

// ── Gateways ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GatewaysArgs {
    #[command(subcommand)]
    pub command: GatewaysCommand,
}

#[derive(Debug, Subcommand)]
pub enum GatewaysCommand {
    /// List gateways
    #[command(alias = "ls")]
    List,

    /// Show one gateway
    Get {
        /// Gateway EUI
        eui: String,
    },

    /// Register a gateway
    Create {
        /// Gateway EUI
        eui: String,

        /// Address the gateway sends from
        ip: IpAddr,

        /// Only accept packets for this EUI from IP
        #[arg(long)]
        strict_ip: bool,

        #[arg(long, requires_all = ["longitude", "altitude"], allow_negative_numbers = true)]
        latitude: Option<f64>,

        #[arg(long, requires_all = ["latitude", "altitude"], allow_negative_numbers = true)]
        longitude: Option<f64>,

        #[arg(long, requires_all = ["latitude", "longitude"], allow_negative_numbers = true)]
        altitude: Option<f64>,
    },

    /// Delete a gateway
    #[command(alias = "rm")]
    Delete {
        /// Gateway EUI
        eui: String,
    },
}

// ── Outputs ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OutputsArgs {
    #[command(subcommand)]
    pub command: OutputsCommand,
}

#[derive(Debug, Subcommand)]
pub enum OutputsCommand {
    /// List the outputs of an application
    #[command(alias = "ls")]
    List {
        /// Application EUI
        app: String,
    },

    /// Forward application data to an MQTT broker
    CreateMqtt(MqttArgs),

    /// Delete an output
    #[command(alias = "rm")]
    Delete {
        /// Application EUI
        app: String,
        /// Output EUI
        eui: String,
    },
}

#[derive(Debug, Args)]
pub struct MqttArgs {
    /// Application EUI
    pub app: String,

    /// Broker host name
    #[arg(long)]
    pub endpoint: String,

    #[arg(long, default_value_t = 1883)]
    pub port: u16,

    /// Connect with TLS
    #[arg(long)]
    pub tls: bool,

    /// Skip broker certificate verification
    #[arg(long)]
    pub no_cert_check: bool,

    #[arg(long, default_value = "")]
    pub username: String,

    #[arg(long, default_value = "", hide_default_value = true)]
    pub password: String,

    #[arg(long, default_value = "")]
    pub client_id: String,

    #[arg(long)]
    pub topic: String,
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_tag(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err("tag key must not be empty".into());
    }
    Ok((key.to_owned(), value.to_owned()))
}
