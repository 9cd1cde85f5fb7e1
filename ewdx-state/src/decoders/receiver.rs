//! Generation-1 receiver decoder
//!
//! Handles the nested JSON documents EW-DX receivers push over UDP:
//! `device` (identity, configuration, network and Dante), `rxN` (channel
//! settings and sync settings), `mates.txN` (paired transmitter telemetry)
//! and `m.rxN` (live RF meters). Multi-slot Dante fields arrive as
//! `[primary, secondary]` arrays.

use serde_json::{Map, Value};

use crate::decoder::{
    at, flag, int, present, slot, text, text_list, DecodeReport, MessageDecoder, Section,
};
use crate::model::{
    CableEmulation, Channel, DantePortMapping, DeviceInfo, DeviceState, Lowcut, Mate, MuteConfig,
    MuteConfigTable, NetworkInterface, SyncSetting,
};

/// Decoder for generation-1 receiver messages
pub struct ReceiverDecoder;

impl MessageDecoder for ReceiverDecoder {
    fn name(&self) -> &'static str {
        "scp1-receiver"
    }

    fn decode(&self, message: &Map<String, Value>, state: &mut DeviceState) -> DecodeReport {
        let mut report = DecodeReport::new();

        if let Some(device) = present(message.get("device")) {
            decode_device(device, state.device_mut(), &mut report);
        }

        for index in 0..state.channels().len() {
            let rx_key = format!("rx{}", index + 1);
            let tx_key = format!("tx{}", index + 1);
            let Some(channel) = state.channel_mut(index) else {
                continue;
            };

            if let Some(meters) = message.get("m").and_then(|m| present(m.get(&rx_key))) {
                decode_meters(meters, channel, Section::Channel(index), &mut report);
            }
            if let Some(mate) = message.get("mates").and_then(|m| present(m.get(&tx_key))) {
                decode_mate(mate, &mut channel.mate, Section::Transmitter(index), &mut report);
            }
            if let Some(rx) = present(message.get(&rx_key)) {
                decode_channel(rx, channel, Section::Channel(index), &mut report);
            }
        }

        report
    }
}

fn decode_device(device: &Value, info: &mut DeviceInfo, report: &mut DecodeReport) {
    let s = Section::Device;
    report.apply(s, "encryption", &mut info.encryption, device.get("encryption"), flag);
    report.apply(s, "link_density_mode", &mut info.link_density_mode, device.get("link_density_mode"), flag);
    report.apply(s, "brightness", &mut info.brightness, device.get("brightness"), int);
    report.apply(s, "name", &mut info.name, device.get("name"), text);
    report.apply(s, "frequency_code", &mut info.frequency_code, device.get("frequency_code"), text);
    report.apply(s, "lock", &mut info.auto_lock, device.get("lock"), flag);
    report.apply(s, "location", &mut info.location, device.get("location"), text);
    report.apply(s, "identity.version", &mut info.firmware_version, at(device, &["identity", "version"]), text);
    report.apply(s, "identity.serial", &mut info.serial, at(device, &["identity", "serial"]), text);
    report.apply(
        s,
        "identification.visual",
        &mut info.identification,
        at(device, &["identification", "visual"]),
        flag,
    );

    let Some(network) = present(device.get("network")) else {
        return;
    };

    if let Some(ipv4) = present(network.get("ipv4")) {
        decode_ipv4(ipv4, &mut info.network, Section::Network, report);
    }
    report.apply(Section::Network, "mdns", &mut info.mdns, network.get("mdns"), flag);

    if let Some(ether) = present(network.get("ether")) {
        let iface = &mut info.network;
        report.apply(Section::Network, "ether.interfaces", &mut iface.name, slot(ether.get("interfaces"), 0), text);
        report.apply(Section::Network, "ether.macs", &mut iface.mac, slot(ether.get("macs"), 0), text);
    }

    if let Some(dante) = present(network.get("dante")) {
        decode_dante(dante, info, report);
    }
}

fn decode_ipv4(ipv4: &Value, iface: &mut NetworkInterface, s: Section, report: &mut DecodeReport) {
    report.apply(s, "ipv4.ipaddr", &mut iface.ip, ipv4.get("ipaddr"), text);
    report.apply(s, "ipv4.netmask", &mut iface.netmask, ipv4.get("netmask"), text);
    report.apply(s, "ipv4.gateway", &mut iface.gateway, ipv4.get("gateway"), text);
    report.apply(s, "ipv4.manual_ipaddr", &mut iface.manual_ip, ipv4.get("manual_ipaddr"), text);
    report.apply(s, "ipv4.manual_netmask", &mut iface.manual_netmask, ipv4.get("manual_netmask"), text);
    report.apply(s, "ipv4.manual_gateway", &mut iface.manual_gateway, ipv4.get("manual_gateway"), text);
    report.apply(s, "ipv4.auto", &mut iface.dhcp, ipv4.get("auto"), flag);
}

fn decode_dante(dante: &Value, info: &mut DeviceInfo, report: &mut DecodeReport) {
    let s = Section::Dante;
    let dante_info = &mut info.dante;
    report.apply(s, "identity.version", &mut dante_info.version, at(dante, &["identity", "version"]), text);
    report.apply(
        s,
        "interface_mapping",
        &mut dante_info.port_mapping,
        dante.get("interface_mapping"),
        |v| v.as_str().and_then(DantePortMapping::from_wire),
    );

    let ipv4 = present(dante.get("ipv4"));
    for port in 0..2 {
        let Some(iface) = dante_info.interface_mut(port) else {
            continue;
        };
        report.apply(s, "macs", &mut iface.mac, slot(dante.get("macs"), port), text);
        report.apply(s, "interfaces", &mut iface.name, slot(dante.get("interfaces"), port), text);

        let Some(ipv4) = ipv4 else {
            continue;
        };
        report.apply(s, "ipv4.ipaddr", &mut iface.ip, slot(ipv4.get("ipaddr"), port), text);
        report.apply(s, "ipv4.netmask", &mut iface.netmask, slot(ipv4.get("netmask"), port), text);
        report.apply(s, "ipv4.gateway", &mut iface.gateway, slot(ipv4.get("gateway"), port), text);
        report.apply(s, "ipv4.manual_ipaddr", &mut iface.manual_ip, slot(ipv4.get("manual_ipaddr"), port), text);
        report.apply(s, "ipv4.manual_netmask", &mut iface.manual_netmask, slot(ipv4.get("manual_netmask"), port), text);
        report.apply(s, "ipv4.manual_gateway", &mut iface.manual_gateway, slot(ipv4.get("manual_gateway"), port), text);
        report.apply(s, "ipv4.auto", &mut iface.dhcp, slot(ipv4.get("auto"), port), flag);
    }
}

fn decode_meters(meters: &Value, channel: &mut Channel, s: Section, report: &mut DecodeReport) {
    report.apply(s, "divi", &mut channel.active_antenna, meters.get("divi"), int);
    report.apply(s, "rsqi", &mut channel.rsqi, meters.get("rsqi"), int);
}

fn decode_mate(mate: &Value, tx: &mut Mate, s: Section, report: &mut DecodeReport) {
    report.apply(s, "mute", &mut tx.muted, mate.get("mute"), flag);
    report.apply(s, "battery.gauge", &mut tx.battery_gauge, at(mate, &["battery", "gauge"]), int);
    report.apply(s, "battery.type", &mut tx.battery_type, at(mate, &["battery", "type"]), text);
    report.apply(s, "battery.lifetime", &mut tx.battery_lifetime, at(mate, &["battery", "lifetime"]), int);
    report.apply(s, "cable_emulation", &mut tx.cable_emulation, mate.get("cable_emulation"), |v| {
        v.as_str().and_then(CableEmulation::from_wire)
    });
    report.apply(s, "capsule", &mut tx.capsule, mate.get("capsule"), text);
    report.apply(s, "identification", &mut tx.identification, mate.get("identification"), flag);
    report.apply(s, "led", &mut tx.led, mate.get("led"), flag);
    report.apply(s, "lock", &mut tx.lock, mate.get("lock"), flag);
    report.apply(s, "lowcut", &mut tx.lowcut, mate.get("lowcut"), |v| {
        v.as_str().and_then(Lowcut::from_wire)
    });
    report.apply(s, "name", &mut tx.name, mate.get("name"), text);
    report.apply(s, "trim", &mut tx.trim, mate.get("trim"), int);
    report.apply(s, "type", &mut tx.kind, mate.get("type"), text);
    report.apply(s, "warnings", &mut tx.warnings, mate.get("warnings"), text_list);
}

fn decode_channel(rx: &Value, channel: &mut Channel, s: Section, report: &mut DecodeReport) {
    if let Some(raw) = present(rx.get("warnings")) {
        match text_list(raw) {
            Some(warnings) if channel.warnings.as_ref() != Some(&warnings) => {
                channel.set_warnings(warnings);
                report.mark(s);
            }
            Some(_) => {}
            None => report.skip(format!("{}.warnings", s)),
        }
    }

    report.apply(s, "frequency", &mut channel.frequency, rx.get("frequency"), int);
    report.apply(s, "name", &mut channel.name, rx.get("name"), text);
    report.apply(s, "mute", &mut channel.muted, rx.get("mute"), flag);
    report.apply(s, "gain", &mut channel.gain, rx.get("gain"), int);
    report.apply(
        s,
        "identification.visual",
        &mut channel.identification,
        at(rx, &["identification", "visual"]),
        flag,
    );

    let Some(sync) = present(rx.get("sync_settings")) else {
        return;
    };

    for setting in SyncSetting::ALL {
        let key = setting.scp1();
        report.apply(s, key, channel.sync_ignore.slot_mut(*setting), sync.get(key), flag);
    }

    let values = &mut channel.sync;
    report.apply(s, "sync_settings.trim", &mut values.trim, sync.get("trim"), int);
    report.apply(s, "sync_settings.mute_config", &mut values.mute_config, sync.get("mute_config"), |v| {
        v.as_str().and_then(MuteConfig::from_wire)
    });
    report.apply(
        s,
        "sync_settings.mute_config_ts",
        &mut values.mute_config_table,
        sync.get("mute_config_ts"),
        |v| v.as_str().and_then(MuteConfigTable::from_wire),
    );
    report.apply(s, "sync_settings.lowcut", &mut values.lowcut, sync.get("lowcut"), |v| {
        v.as_str().and_then(Lowcut::from_wire)
    });
    report.apply(s, "sync_settings.lock", &mut values.lock, sync.get("lock"), flag);
    report.apply(s, "sync_settings.led", &mut values.led, sync.get("led"), flag);
    report.apply(
        s,
        "sync_settings.cable_emulation",
        &mut values.cable_emulation,
        sync.get("cable_emulation"),
        |v| v.as_str().and_then(CableEmulation::from_wire),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceModel;
    use serde_json::json;

    fn decode(state: &mut DeviceState, message: Value) -> DecodeReport {
        let Value::Object(map) = message else {
            panic!("test message must be an object");
        };
        ReceiverDecoder.decode(&map, state)
    }

    #[test]
    fn test_channel_mute_reply() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        let report = decode(&mut state, json!({"rx1": {"mute": true}}));

        assert_eq!(state.channel(0).unwrap().muted, Some(true));
        assert_eq!(state.channel(1).unwrap().muted, None);
        assert_eq!(report.sections().collect::<Vec<_>>(), vec![Section::Channel(0)]);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut state = DeviceState::new(DeviceModel::Em4);
        decode(&mut state, json!({"rx3": {"name": "VOX", "gain": 12, "frequency": 606000}}));
        decode(&mut state, json!({"rx3": {"gain": 15}}));

        let channel = state.channel(2).unwrap();
        assert_eq!(channel.name.as_deref(), Some("VOX"));
        assert_eq!(channel.gain, Some(15));
        assert_eq!(channel.frequency, Some(606000));
    }

    #[test]
    fn test_repeat_message_is_unchanged() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        let message = json!({"rx2": {"name": "GTR", "mute": false}});
        assert!(decode(&mut state, message.clone()).has_changes());
        assert!(!decode(&mut state, message).has_changes());
    }

    #[test]
    fn test_channels_beyond_model_are_ignored() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        let report = decode(&mut state, json!({"rx3": {"mute": true}}));
        assert!(!report.has_changes());
        assert!(report.skipped().is_empty());
    }

    #[test]
    fn test_warnings_derive_flags() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        decode(&mut state, json!({"rx1": {"warnings": ["AfPeak", "Aes256Error"]}}));
        let channel = state.channel(0).unwrap();
        assert_eq!(channel.af_peak, Some(true));
        assert_eq!(channel.aes256_error, Some(true));
        assert_eq!(channel.has_warnings, Some(true));

        decode(&mut state, json!({"rx1": {"warnings": []}}));
        let channel = state.channel(0).unwrap();
        assert_eq!(channel.af_peak, Some(false));
        assert_eq!(channel.has_warnings, Some(false));
    }

    #[test]
    fn test_sync_settings() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        decode(
            &mut state,
            json!({"rx1": {"sync_settings": {
                "lowcut_ignore": true,
                "trim": -6,
                "mute_config": "af_mute",
                "mute_config_ts": "push_to_talk",
                "lowcut": "60 Hz",
                "cable_emulation": "type2",
                "led": false
            }}}),
        );

        let channel = state.channel(0).unwrap();
        assert_eq!(channel.sync_ignore.lowcut, Some(true));
        assert_eq!(channel.sync_ignore.trim, None);
        assert_eq!(channel.sync.trim, Some(-6));
        assert_eq!(channel.sync.mute_config, Some(MuteConfig::AfMute));
        assert_eq!(channel.sync.mute_config_table, Some(MuteConfigTable::PushToTalk));
        assert_eq!(channel.sync.lowcut, Some(Lowcut::Hz60));
        assert_eq!(channel.sync.cable_emulation, Some(CableEmulation::Type2));
        assert_eq!(channel.sync.led, Some(false));
    }

    #[test]
    fn test_unknown_option_is_skipped() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        let report = decode(&mut state, json!({"rx1": {"sync_settings": {"lowcut": "45 Hz"}}}));
        assert_eq!(report.skipped(), &["rx1.sync_settings.lowcut".to_string()]);
        assert_eq!(state.channel(0).unwrap().sync.lowcut, None);
    }

    #[test]
    fn test_mates_and_meters() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        let report = decode(
            &mut state,
            json!({
                "mates": {"tx2": {"battery": {"gauge": 70, "type": "BA70", "lifetime": 300}, "capsule": "MMD 835", "lowcut": "80 Hz"}},
                "m": {"rx2": {"divi": 2, "rsqi": 95}}
            }),
        );

        let channel = state.channel(1).unwrap();
        assert_eq!(channel.mate.battery_gauge, Some(70));
        assert_eq!(channel.mate.battery_type.as_deref(), Some("BA70"));
        assert_eq!(channel.mate.battery_lifetime, Some(300));
        assert_eq!(channel.mate.capsule.as_deref(), Some("MMD 835"));
        assert_eq!(channel.mate.lowcut, Some(Lowcut::Hz80));
        assert_eq!(channel.active_antenna, Some(2));
        assert_eq!(channel.rsqi, Some(95));
        let sections: Vec<_> = report.sections().collect();
        assert_eq!(sections, vec![Section::Channel(1), Section::Transmitter(1)]);
    }

    #[test]
    fn test_device_and_network() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        decode(
            &mut state,
            json!({"device": {
                "name": "STAGE-L",
                "brightness": 3,
                "lock": true,
                "identity": {"version": "3.2.0", "serial": "1234567"},
                "network": {
                    "ipv4": {"ipaddr": "192.168.1.20", "auto": false, "manual_gateway": null},
                    "mdns": true,
                    "ether": {"interfaces": ["eth0"], "macs": ["00:1b:66:aa:bb:cc"]}
                }
            }}),
        );

        let device = state.device();
        assert_eq!(device.name.as_deref(), Some("STAGE-L"));
        assert_eq!(device.brightness, Some(3));
        assert_eq!(device.auto_lock, Some(true));
        assert_eq!(device.firmware_version.as_deref(), Some("3.2.0"));
        assert_eq!(device.serial.as_deref(), Some("1234567"));
        assert_eq!(device.network.ip.as_deref(), Some("192.168.1.20"));
        assert_eq!(device.network.dhcp, Some(false));
        assert_eq!(device.network.manual_gateway, None);
        assert_eq!(device.network.mac.as_deref(), Some("00:1b:66:aa:bb:cc"));
        assert_eq!(device.mdns, Some(true));
    }

    #[test]
    fn test_dante_interfaces_are_positional() {
        let mut state = DeviceState::new(DeviceModel::Em4);
        let report = decode(
            &mut state,
            json!({"device": {"network": {"dante": {
                "identity": {"version": "4.2.1"},
                "interface_mapping": "SPLIT",
                "macs": ["aa", "bb"],
                "ipv4": {"ipaddr": ["10.0.0.1", "10.0.1.1"], "auto": [true, false]}
            }}}}),
        );

        let dante = &state.device().dante;
        assert_eq!(dante.version.as_deref(), Some("4.2.1"));
        assert_eq!(dante.port_mapping, Some(DantePortMapping::Split));
        assert_eq!(dante.primary.mac.as_deref(), Some("aa"));
        assert_eq!(dante.secondary.ip.as_deref(), Some("10.0.1.1"));
        assert_eq!(dante.primary.dhcp, Some(true));
        assert_eq!(dante.secondary.dhcp, Some(false));
        assert_eq!(report.sections().collect::<Vec<_>>(), vec![Section::Dante]);
    }
}
