//! Device controllers
//!
//! [`DeviceControl`] is the command surface the host calls. There is one
//! implementation per device family and protocol generation:
//!
//! | Controller        | Devices                 | Transport                         |
//! |-------------------|-------------------------|-----------------------------------|
//! | [`Scp1Receiver`]  | EM 2, EM 2 Dante, EM 4  | datagrams through the session     |
//! | [`Scp2Receiver`]  | EM 2, EM 2 Dante, EM 4  | REST `PUT`, request/response      |
//! | [`Scp1Charger`]   | CHG 70N                 | datagrams through the session     |
//!
//! Every method clamps its input to the device's accepted domain before
//! encoding. Controllers never touch the [`DeviceStore`](ewdx_state::DeviceStore);
//! the model only changes when the device reports the new value.
//!
//! Operations a device family lacks return [`SdkError::Unsupported`] without
//! touching the transport. Operations a family has but a protocol generation
//! cannot express are accepted and logged as no-ops.

mod charger;
mod scp1;
mod scp2;

pub use charger::Scp1Charger;
pub use scp1::Scp1Receiver;
pub use scp2::Scp2Receiver;

use async_trait::async_trait;
use ewdx_state::{
    CableEmulation, DantePortMapping, DeviceModel, Lowcut, MuteConfig, MuteConfigTable,
    PresetType, SyncSetting,
};
use ewdx_stream::DatagramSender;
use serde_json::Value;

use crate::error::{Result, SdkError};

/// Outbound path for generation-1 documents
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn send(&self, document: Value) -> Result<()>;
}

#[async_trait]
impl CommandSink for DatagramSender {
    async fn send(&self, document: Value) -> Result<()> {
        Ok(DatagramSender::send(self, document).await?)
    }
}

/// IPv4 settings for the device's own or a Dante interface
///
/// Empty address fields are left untouched on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSettings {
    pub dhcp: bool,
    /// Only used for the device interface
    pub mdns: bool,
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
}

/// Dante network interface slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanteInterface {
    Primary,
    Secondary,
}

impl DanteInterface {
    pub fn slot(&self) -> usize {
        match self {
            DanteInterface::Primary => 0,
            DanteInterface::Secondary => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainDirection {
    Up,
    Down,
}

/// One bay sync setting of a charger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaySync {
    Name(String),
    MuteConfig(MuteConfig),
    CableEmulation(CableEmulation),
    Led(bool),
    Lock(bool),
    Lowcut(Lowcut),
    LinkDensityMode(bool),
    /// kHz
    Frequency(i64),
    /// dB
    Trim(i64),
}

/// Imperative command surface of one device
///
/// Channel and bay indices are zero-based. Every method has a default that
/// reports the operation as unsupported for [`DeviceControl::model`].
#[async_trait]
pub trait DeviceControl: Send + Sync {
    fn model(&self) -> DeviceModel;

    fn unsupported(&self, operation: &'static str) -> SdkError {
        SdkError::Unsupported {
            operation,
            model: self.model(),
        }
    }

    // ------------------------------------------------------------------
    // Device
    // ------------------------------------------------------------------

    async fn restart(&self) -> Result<()> {
        Err(self.unsupported("restart"))
    }

    /// Display brightness, 1 to 5
    async fn set_brightness(&self, _level: i64) -> Result<()> {
        Err(self.unsupported("set_brightness"))
    }

    async fn set_name(&self, _name: &str) -> Result<()> {
        Err(self.unsupported("set_name"))
    }

    async fn set_location(&self, _location: &str) -> Result<()> {
        Err(self.unsupported("set_location"))
    }

    async fn set_identification(&self, _on: bool) -> Result<()> {
        Err(self.unsupported("set_identification"))
    }

    async fn set_auto_lock(&self, _on: bool) -> Result<()> {
        Err(self.unsupported("set_auto_lock"))
    }

    async fn set_encryption(&self, _on: bool) -> Result<()> {
        Err(self.unsupported("set_encryption"))
    }

    async fn set_link_density_mode(&self, _on: bool) -> Result<()> {
        Err(self.unsupported("set_link_density_mode"))
    }

    async fn set_network_settings(&self, _settings: &NetworkSettings) -> Result<()> {
        Err(self.unsupported("set_network_settings"))
    }

    async fn set_dante_network_settings(
        &self,
        _interface: DanteInterface,
        _settings: &NetworkSettings,
    ) -> Result<()> {
        Err(self.unsupported("set_dante_network_settings"))
    }

    async fn set_dante_port_mapping(&self, _mapping: DantePortMapping) -> Result<()> {
        Err(self.unsupported("set_dante_port_mapping"))
    }

    // ------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------

    async fn set_mute(&self, _channel: usize, _muted: bool) -> Result<()> {
        Err(self.unsupported("set_mute"))
    }

    /// Invert the mute state last reported by the device
    async fn toggle_mute(&self, _channel: usize) -> Result<()> {
        Err(self.unsupported("toggle_mute"))
    }

    async fn set_channel_name(&self, _channel: usize, _name: &str) -> Result<()> {
        Err(self.unsupported("set_channel_name"))
    }

    async fn set_gain(&self, _channel: usize, _db: i64) -> Result<()> {
        Err(self.unsupported("set_gain"))
    }

    /// Move `steps` gain steps from the gain last reported by the device
    async fn adjust_gain(&self, _channel: usize, _direction: GainDirection, _steps: u32) -> Result<()> {
        Err(self.unsupported("adjust_gain"))
    }

    async fn set_frequency(&self, _channel: usize, _khz: i64) -> Result<()> {
        Err(self.unsupported("set_frequency"))
    }

    async fn set_channel_identification(&self, _channel: usize, _on: bool) -> Result<()> {
        Err(self.unsupported("set_channel_identification"))
    }

    async fn set_mute_config(&self, _channel: usize, _config: MuteConfig) -> Result<()> {
        Err(self.unsupported("set_mute_config"))
    }

    async fn set_mute_config_table(&self, _channel: usize, _config: MuteConfigTable) -> Result<()> {
        Err(self.unsupported("set_mute_config_table"))
    }

    async fn set_lowcut(&self, _channel: usize, _lowcut: Lowcut) -> Result<()> {
        Err(self.unsupported("set_lowcut"))
    }

    async fn set_sync_lock(&self, _channel: usize, _locked: bool) -> Result<()> {
        Err(self.unsupported("set_sync_lock"))
    }

    async fn set_sync_led(&self, _channel: usize, _on: bool) -> Result<()> {
        Err(self.unsupported("set_sync_led"))
    }

    async fn set_cable_emulation(&self, _channel: usize, _mode: CableEmulation) -> Result<()> {
        Err(self.unsupported("set_cable_emulation"))
    }

    async fn set_sync_trim(&self, _channel: usize, _db: i64) -> Result<()> {
        Err(self.unsupported("set_sync_trim"))
    }

    async fn set_sync_ignore(&self, _channel: usize, _setting: SyncSetting, _ignore: bool) -> Result<()> {
        Err(self.unsupported("set_sync_ignore"))
    }

    async fn set_output_level(&self, _channel: usize, _db: i64) -> Result<()> {
        Err(self.unsupported("set_output_level"))
    }

    async fn set_low_cut_hz(&self, _channel: usize, _hz: i64) -> Result<()> {
        Err(self.unsupported("set_low_cut_hz"))
    }

    async fn restore_audio_defaults(&self, _channel: usize) -> Result<()> {
        Err(self.unsupported("restore_audio_defaults"))
    }

    async fn acknowledge_channel_sorting(&self, _channel: usize) -> Result<()> {
        Err(self.unsupported("acknowledge_channel_sorting"))
    }

    async fn set_frequency_preset(
        &self,
        _channel: usize,
        _kind: PresetType,
        _bank: u32,
        _preset: u32,
    ) -> Result<()> {
        Err(self.unsupported("set_frequency_preset"))
    }

    // ------------------------------------------------------------------
    // Charger bays
    // ------------------------------------------------------------------

    async fn set_bay_identify(&self, _bay: usize, _on: bool) -> Result<()> {
        Err(self.unsupported("set_bay_identify"))
    }

    async fn set_bay_sync(&self, _bay: usize, _setting: BaySync) -> Result<()> {
        Err(self.unsupported("set_bay_sync"))
    }
}

/// Two-slot array addressing one slot; the other stays `null`
pub(crate) fn slot_array(slot: usize, value: Value) -> Value {
    let mut slots = vec![Value::Null, Value::Null];
    if let Some(target) = slots.get_mut(slot) {
        *target = value;
    }
    Value::Array(slots)
}
