//! Timing configuration for the transport sessions
//!
//! Every timer a session runs is configurable here. The defaults are the
//! values real EW-DX devices are known to work with; overrides are mostly
//! useful in tests and on slow networks.
//!
//! Durations serialize as integer milliseconds so the structures can be
//! embedded in a JSON adapter configuration.

use std::time::Duration;

use ewdx_state::DeviceModel;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Timers of the generation-1 datagram session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatagramTiming {
    /// Silence after a send before the device is declared offline
    /// Default: 2 seconds
    #[serde(with = "millis")]
    pub response_timeout: Duration,

    /// Interval of the device-name liveness probe
    /// Default: 5 seconds
    #[serde(with = "millis")]
    pub probe_interval: Duration,

    /// Resubscribe and static-info refresh interval for receivers
    /// Default: 59 seconds (leases last 60)
    #[serde(with = "millis")]
    pub receiver_refresh_interval: Duration,

    /// Resubscribe and static-info refresh interval for chargers
    /// Default: 9 seconds (device leases last 10)
    #[serde(with = "millis")]
    pub charger_refresh_interval: Duration,

    /// Delay before the first static-info query
    /// Default: 1 second
    #[serde(with = "millis")]
    pub static_info_delay: Duration,
}

impl Default for DatagramTiming {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(2),
            probe_interval: Duration::from_secs(5),
            receiver_refresh_interval: Duration::from_secs(59),
            charger_refresh_interval: Duration::from_secs(9),
            static_info_delay: Duration::from_secs(1),
        }
    }
}

impl DatagramTiming {
    /// Refresh interval for the given hardware model
    pub fn refresh_interval(&self, model: DeviceModel) -> Duration {
        if model.is_charger() {
            self.charger_refresh_interval
        } else {
            self.receiver_refresh_interval
        }
    }

    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("response_timeout", self.response_timeout),
            ("probe_interval", self.probe_interval),
            ("receiver_refresh_interval", self.receiver_refresh_interval),
            ("charger_refresh_interval", self.charger_refresh_interval),
        ];
        for (name, value) in intervals {
            if value.is_zero() {
                return Err(SessionError::Configuration(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Timers and retry budget of the generation-2 stream session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamTiming {
    /// First reconnect delay; doubles on each further attempt
    /// Default: 2 seconds
    #[serde(with = "millis")]
    pub reconnect_base: Duration,

    /// Upper bound of the reconnect delay
    /// Default: 30 seconds
    #[serde(with = "millis")]
    pub reconnect_cap: Duration,

    /// Reconnect attempts before giving up for good
    /// Default: 10
    pub max_reconnect_attempts: u32,

    /// Interval of the lease heartbeat
    /// Default: 60 seconds
    #[serde(with = "millis")]
    pub heartbeat_interval: Duration,
}

impl Default for StreamTiming {
    fn default() -> Self {
        Self {
            reconnect_base: Duration::from_secs(2),
            reconnect_cap: Duration::from_secs(30),
            max_reconnect_attempts: 10,
            heartbeat_interval: Duration::from_secs(60),
        }
    }
}

impl StreamTiming {
    pub fn validate(&self) -> Result<()> {
        if self.reconnect_base.is_zero() || self.heartbeat_interval.is_zero() {
            return Err(SessionError::Configuration(
                "reconnect_base and heartbeat_interval must be greater than 0".to_string(),
            ));
        }
        if self.reconnect_base > self.reconnect_cap {
            return Err(SessionError::Configuration(
                "reconnect_base must not exceed reconnect_cap".to_string(),
            ));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let datagram = DatagramTiming::default();
        assert_eq!(datagram.response_timeout, Duration::from_secs(2));
        assert_eq!(datagram.refresh_interval(DeviceModel::Em4), Duration::from_secs(59));
        assert_eq!(datagram.refresh_interval(DeviceModel::Chg70n), Duration::from_secs(9));
        assert!(datagram.validate().is_ok());

        let stream = StreamTiming::default();
        assert_eq!(stream.max_reconnect_attempts, 10);
        assert!(stream.validate().is_ok());
    }

    #[test]
    fn test_partial_json_override() {
        let timing: DatagramTiming =
            serde_json::from_str(r#"{"response_timeout": 3500}"#).unwrap();
        assert_eq!(timing.response_timeout, Duration::from_millis(3500));
        assert_eq!(timing.probe_interval, Duration::from_secs(5));

        let json = serde_json::to_value(StreamTiming::default()).unwrap();
        assert_eq!(json["heartbeat_interval"], 60_000);
    }

    #[test]
    fn test_validation() {
        let zero_probe = DatagramTiming {
            probe_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero_probe.validate().is_err());

        let inverted = StreamTiming {
            reconnect_base: Duration::from_secs(60),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
