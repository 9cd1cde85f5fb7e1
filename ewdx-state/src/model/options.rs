//! Enumerated device settings and their wire spellings
//!
//! Generation-1 devices spell options in snake case (`rf_mute`, `30 Hz`),
//! generation-2 devices in camel/pascal case (`RfMute`, `30Hz`). Each option
//! knows both spellings and [`from_wire`](MuteConfig::from_wire) accepts
//! either, so decoders for both generations share one typed model.

use serde::{Deserialize, Serialize};

/// Macro for declaring an option enum with generation-1 and generation-2 spellings
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($scp1:expr, $scp2:expr) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant in wire order
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Generation-1 (UDP/JSON) spelling
            pub fn scp1(&self) -> &'static str {
                match self {
                    $( $name::$variant => $scp1 ),+
                }
            }

            /// Generation-2 (REST) spelling
            pub fn scp2(&self) -> &'static str {
                match self {
                    $( $name::$variant => $scp2 ),+
                }
            }

            /// Parse either generation's spelling
            pub fn from_wire(value: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.scp1() == value || option.scp2() == value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.scp1())
            }
        }
    };
}

wire_enum! {
    /// Transmitter mute switch behaviour
    MuteConfig {
        Off => ("off", "Off"),
        RfMute => ("rf_mute", "RfMute"),
        AfMute => ("af_mute", "AfMute"),
    }
}

wire_enum! {
    /// Mute switch behaviour for table-stand transmitters
    MuteConfigTable {
        Off => ("off", "Off"),
        AfMute => ("af_mute", "AfMute"),
        PushToTalk => ("push_to_talk", "PTT"),
        PushToMute => ("push_to_mute", "PTM"),
    }
}

wire_enum! {
    /// Transmitter low-cut filter
    Lowcut {
        Off => ("off", "Off"),
        Hz30 => ("30 Hz", "30Hz"),
        Hz60 => ("60 Hz", "60Hz"),
        Hz80 => ("80 Hz", "80Hz"),
        Hz100 => ("100 Hz", "100Hz"),
        Hz120 => ("120 Hz", "120Hz"),
    }
}

wire_enum! {
    /// Instrument cable emulation on the transmitter
    CableEmulation {
        Off => ("off", "Off"),
        Type1 => ("type1", "Type1"),
        Type2 => ("type2", "Type2"),
        Type3 => ("type3", "Type3"),
    }
}

wire_enum! {
    /// How the Dante ports are used
    DantePortMapping {
        SingleCable => ("SINGLE_CABLE", "SingleCable"),
        Split1 => ("SPLIT1", "Split1"),
        Split2 => ("SPLIT2", "Split2"),
        Split => ("SPLIT", "Split"),
        AudioRedundancy => ("AUDIO_REDUNDANCY", "AudioRedundancy"),
    }
}

wire_enum! {
    /// Parameters a channel can exclude from transmitter sync
    SyncSetting {
        Trim => ("trim_ignore", "trim"),
        Name => ("name_ignore", "name"),
        MuteConfig => ("mute_config_ignore", "muteConfig"),
        Lowcut => ("lowcut_ignore", "lowcut"),
        Lock => ("lock_ignore", "lock"),
        Led => ("led_ignore", "led"),
        Frequency => ("frequency_ignore", "frequency"),
        CableEmulation => ("cable_emulation_ignore", "cableEmulation"),
    }
}

wire_enum! {
    /// Lifecycle state of a charging bay
    BayState {
        Normal => ("NORMAL", "Normal"),
        Update => ("UPDATE", "Update"),
        Error => ("ERROR", "Error"),
        DfuMode => ("DFU_MODE", "DfuMode"),
    }
}

wire_enum! {
    /// Fault reported by a charging bay
    BayWarning {
        BatteryComError => ("BatteryComError", "BatteryComError"),
        BatteryNotChargeable => ("BatteryNotChargeable", "BatteryNotChargeable"),
        BatteryNotDischargeable => ("BatteryNotDischargeable", "BatteryNotDischargeable"),
        OvercurrentDetected => ("OvercurrentDetected", "OvercurrentDetected"),
        BatteryTempOutOfRange => ("BatteryTempOutOfRange", "BatteryTempOutOfRange"),
    }
}

wire_enum! {
    /// Device sitting in a charging bay
    ChargingDevice {
        Sk => ("EW-DX SK", "EW-DX SK"),
        Sk3Pin => ("EW-DX SK 3-pin", "EW-DX SK 3-pin"),
        Skm => ("EW-DX SKM", "EW-DX SKM"),
        SkmS => ("EW-DX SKM-S", "EW-DX SKM-S"),
        Ba70 => ("BA70", "BA70"),
        Empty => ("NONE", "None"),
        Unknown => ("UNKNOWN", "Unknown"),
    }
}

/// Factory or user frequency preset bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetType {
    Factory,
    User,
}

impl PresetType {
    /// REST spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetType::Factory => "Factory",
            PresetType::User => "User",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rf_mute", MuteConfig::RfMute)]
    #[case("RfMute", MuteConfig::RfMute)]
    #[case("off", MuteConfig::Off)]
    fn test_mute_config_accepts_both_spellings(#[case] wire: &str, #[case] expected: MuteConfig) {
        assert_eq!(MuteConfig::from_wire(wire), Some(expected));
    }

    #[test]
    fn test_table_mute_uses_short_rest_names() {
        assert_eq!(MuteConfigTable::PushToTalk.scp1(), "push_to_talk");
        assert_eq!(MuteConfigTable::PushToTalk.scp2(), "PTT");
        assert_eq!(MuteConfigTable::from_wire("PTM"), Some(MuteConfigTable::PushToMute));
    }

    #[test]
    fn test_lowcut_spellings() {
        assert_eq!(Lowcut::from_wire("80 Hz"), Some(Lowcut::Hz80));
        assert_eq!(Lowcut::from_wire("80Hz"), Some(Lowcut::Hz80));
        assert_eq!(Lowcut::Hz120.scp2(), "120Hz");
        assert_eq!(Lowcut::from_wire("90 Hz"), None);
    }

    #[test]
    fn test_sync_setting_keys() {
        assert_eq!(SyncSetting::CableEmulation.scp1(), "cable_emulation_ignore");
        assert_eq!(SyncSetting::CableEmulation.scp2(), "cableEmulation");
        assert_eq!(SyncSetting::ALL.len(), 8);
    }

    #[test]
    fn test_charger_enums() {
        assert_eq!(BayState::from_wire("DFU_MODE"), Some(BayState::DfuMode));
        assert_eq!(ChargingDevice::from_wire("EW-DX SK 3-pin"), Some(ChargingDevice::Sk3Pin));
        assert_eq!(BayWarning::from_wire("OvercurrentDetected"), Some(BayWarning::OvercurrentDetected));
        assert_eq!(DantePortMapping::AudioRedundancy.to_string(), "AUDIO_REDUNDANCY");
    }
}
