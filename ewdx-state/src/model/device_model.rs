//! Supported hardware models and their fixed capabilities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hardware model of the managed device
///
/// The model fixes the channel and bay counts for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceModel {
    /// EW-DX EM 2 two-channel receiver
    Em2,
    /// EW-DX EM 2 Dante two-channel receiver
    Em2Dante,
    /// EW-DX EM 4 Dante four-channel receiver
    Em4,
    /// CHG 70N network charger
    Chg70n,
}

impl DeviceModel {
    /// Number of receiver channels (and paired transmitters)
    pub fn channel_count(&self) -> usize {
        match self {
            DeviceModel::Em4 => 4,
            DeviceModel::Em2 | DeviceModel::Em2Dante => 2,
            DeviceModel::Chg70n => 0,
        }
    }

    /// Number of charging bays
    pub fn bay_count(&self) -> usize {
        match self {
            DeviceModel::Chg70n => 2,
            _ => 0,
        }
    }

    /// Whether the device has a Dante network card
    pub fn has_dante(&self) -> bool {
        matches!(self, DeviceModel::Em4 | DeviceModel::Em2Dante)
    }

    /// Whether the device is a charger rather than a receiver
    pub fn is_charger(&self) -> bool {
        matches!(self, DeviceModel::Chg70n)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceModel::Em2 => "em2",
            DeviceModel::Em2Dante => "em2_dante",
            DeviceModel::Em4 => "em4",
            DeviceModel::Chg70n => "chg70n",
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "em2" => Ok(DeviceModel::Em2),
            "em2_dante" | "em2dante" => Ok(DeviceModel::Em2Dante),
            "em4" => Ok(DeviceModel::Em4),
            "chg70n" => Ok(DeviceModel::Chg70n),
            other => Err(format!("unknown device model: {}", other)),
        }
    }
}

/// Control protocol generation spoken by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// JSON over UDP port 45
    #[default]
    Scp1,
    /// REST and server-sent events over HTTPS
    Scp2,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Scp1 => write!(f, "SCPv1"),
            Protocol::Scp2 => write!(f, "SCPv2"),
        }
    }
}
