//! Adapter configuration
//!
//! One [`AdapterConfig`] describes one physical device. It is usually loaded
//! from JSON:
//!
//! ```json
//! {
//!   "host": "192.168.1.20",
//!   "model": "em4",
//!   "protocol": "scp2",
//!   "password": "secret",
//!   "stream": { "heartbeat_interval": 30000 }
//! }
//! ```
//!
//! Timing blocks are optional and default to the values devices are known
//! to work with. Durations are integer milliseconds.

use std::net::IpAddr;
use std::path::Path;

use ewdx_state::{DeviceModel, Protocol};
use ewdx_stream::{DatagramTiming, StreamTiming};
use serde::{Deserialize, Serialize};
use ssc_client::SSC_UDP_PORT;
use thiserror::Error;

/// A configuration that must not reach the transport layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing IP address!")]
    MissingHost,

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    #[error("A third-party API password is required for SCPv2")]
    MissingPassword,

    #[error("{model} does not speak {protocol}")]
    UnsupportedProtocol { model: DeviceModel, protocol: Protocol },

    /// The link handed to the adapter speaks a different generation
    #[error("{0} needs a matching device link")]
    LinkMismatch(Protocol),

    #[error("Invalid timing: {0}")]
    Timing(String),

    #[error("Could not read configuration: {0}")]
    Io(String),

    #[error("Could not parse configuration: {0}")]
    Parse(String),
}

/// Everything needed to manage one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Device IP address or host name
    pub host: String,

    pub model: DeviceModel,

    #[serde(default)]
    pub protocol: Protocol,

    /// Third-party API password (SCPv2 only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Local UDP port to bind (SCPv1)
    /// Default: 45, the port devices answer to
    #[serde(default = "default_udp_port")]
    pub local_port: u16,

    /// Device UDP port (SCPv1)
    /// Default: 45
    #[serde(default = "default_udp_port")]
    pub device_port: u16,

    #[serde(default)]
    pub datagram: DatagramTiming,

    #[serde(default)]
    pub stream: StreamTiming,
}

fn default_udp_port() -> u16 {
    SSC_UDP_PORT
}

impl AdapterConfig {
    /// SCPv1 configuration with default ports and timing
    pub fn scp1(host: impl Into<String>, model: DeviceModel) -> Self {
        Self {
            host: host.into(),
            model,
            protocol: Protocol::Scp1,
            password: None,
            local_port: SSC_UDP_PORT,
            device_port: SSC_UDP_PORT,
            datagram: DatagramTiming::default(),
            stream: StreamTiming::default(),
        }
    }

    /// SCPv2 configuration with default timing
    pub fn scp2(host: impl Into<String>, model: DeviceModel, password: impl Into<String>) -> Self {
        Self {
            protocol: Protocol::Scp2,
            password: Some(password.into()),
            ..Self::scp1(host, model)
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject configurations no session could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if host.parse::<IpAddr>().is_err() && !is_host_name(host) {
            return Err(ConfigError::InvalidHost(host.to_string()));
        }

        if self.model.is_charger() && self.protocol == Protocol::Scp2 {
            return Err(ConfigError::UnsupportedProtocol {
                model: self.model,
                protocol: self.protocol,
            });
        }

        match self.protocol {
            Protocol::Scp1 => self
                .datagram
                .validate()
                .map_err(|e| ConfigError::Timing(e.to_string())),
            Protocol::Scp2 => {
                let has_password = self
                    .password
                    .as_deref()
                    .is_some_and(|password| !password.is_empty());
                if !has_password {
                    return Err(ConfigError::MissingPassword);
                }
                self.stream
                    .validate()
                    .map_err(|e| ConfigError::Timing(e.to_string()))
            }
        }
    }
}

/// RFC 1123 host name: dot-separated labels of letters, digits and inner hyphens
fn is_host_name(host: &str) -> bool {
    host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
