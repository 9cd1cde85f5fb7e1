//! Receiver channel and paired transmitter state

use serde::{Deserialize, Serialize};

use super::options::{CableEmulation, Lowcut, MuteConfig, MuteConfigTable, SyncSetting};

/// Per-parameter opt-outs from transmitter sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncIgnore {
    pub trim: Option<bool>,
    pub name: Option<bool>,
    pub mute_config: Option<bool>,
    pub lowcut: Option<bool>,
    pub lock: Option<bool>,
    pub led: Option<bool>,
    pub frequency: Option<bool>,
    pub cable_emulation: Option<bool>,
}

impl SyncIgnore {
    pub fn get(&self, setting: SyncSetting) -> Option<bool> {
        match setting {
            SyncSetting::Trim => self.trim,
            SyncSetting::Name => self.name,
            SyncSetting::MuteConfig => self.mute_config,
            SyncSetting::Lowcut => self.lowcut,
            SyncSetting::Lock => self.lock,
            SyncSetting::Led => self.led,
            SyncSetting::Frequency => self.frequency,
            SyncSetting::CableEmulation => self.cable_emulation,
        }
    }

    pub(crate) fn slot_mut(&mut self, setting: SyncSetting) -> &mut Option<bool> {
        match setting {
            SyncSetting::Trim => &mut self.trim,
            SyncSetting::Name => &mut self.name,
            SyncSetting::MuteConfig => &mut self.mute_config,
            SyncSetting::Lowcut => &mut self.lowcut,
            SyncSetting::Lock => &mut self.lock,
            SyncSetting::Led => &mut self.led,
            SyncSetting::Frequency => &mut self.frequency,
            SyncSetting::CableEmulation => &mut self.cable_emulation,
        }
    }
}

/// Values the receiver pushes to its transmitter on sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncValues {
    pub trim: Option<i64>,
    pub mute_config: Option<MuteConfig>,
    pub mute_config_table: Option<MuteConfigTable>,
    pub lowcut: Option<Lowcut>,
    pub lock: Option<bool>,
    pub led: Option<bool>,
    pub cable_emulation: Option<CableEmulation>,
}

/// The transmitter paired with a channel
///
/// Populated independently of the channel's own fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mate {
    pub name: Option<String>,
    /// Transmitter kind, e.g. `SK` or `SKM`
    pub kind: Option<String>,
    pub battery_gauge: Option<i64>,
    pub battery_type: Option<String>,
    /// Remaining battery lifetime in minutes
    pub battery_lifetime: Option<i64>,
    pub muted: Option<bool>,
    pub capsule: Option<String>,
    pub trim: Option<i64>,
    pub lowcut: Option<Lowcut>,
    pub lock: Option<bool>,
    pub led: Option<bool>,
    pub identification: Option<bool>,
    pub cable_emulation: Option<CableEmulation>,
    pub warnings: Option<Vec<String>>,
}

/// RF frequency preset selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyPreset {
    pub kind: Option<String>,
    pub bank: Option<i64>,
    pub channel: Option<i64>,
}

/// One receiver channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: Option<String>,
    pub muted: Option<bool>,
    /// Gain in dB, one of the 3 dB steps
    pub gain: Option<i64>,
    /// Frequency in kHz
    pub frequency: Option<i64>,
    pub identification: Option<bool>,
    /// Antenna currently selected by the diversity logic
    pub active_antenna: Option<i64>,
    /// Signal quality in percent
    pub rsqi: Option<i64>,
    pub has_warnings: Option<bool>,
    pub af_peak: Option<bool>,
    pub aes256_error: Option<bool>,
    pub sync_ignore: SyncIgnore,
    pub sync: SyncValues,
    pub mate: Mate,

    // REST-only telemetry
    pub signal_strength: Option<i64>,
    pub audio_level: Option<i64>,
    pub output_level: Option<i64>,
    pub low_cut_hz: Option<i64>,
    pub warnings: Option<Vec<String>>,
    pub preset: FrequencyPreset,
}

impl Channel {
    /// Replace the warning list and derive the flag fields from it
    pub(crate) fn set_warnings(&mut self, warnings: Vec<String>) {
        self.has_warnings = Some(!warnings.is_empty());
        self.af_peak = Some(warnings.iter().any(|w| w == "AfPeak"));
        self.aes256_error = Some(warnings.iter().any(|w| w == "Aes256Error"));
        self.warnings = Some(warnings);
    }
}
