//! Generation-2 resource decoder
//!
//! Pushes on the REST subscription stream are objects keyed by resource path
//! (`{"/api/channel/0": {...}, "/api/rf": {...}}`). Each key is routed with
//! [`Resource::parse`] and its body applied to the matching part of the
//! model. Keys that do not route, and channel indices the model does not
//! have, are skipped and reported.

use serde_json::{Map, Value};
use ssc_codec::resource::{
    ChannelResource, DeviceResource, RfChannelResource, RfResource, TransmitterResource,
};
use ssc_codec::Resource;
use tracing::{debug, warn};

use crate::decoder::{
    flag, int, present, text, text_list, DecodeReport, MessageDecoder, Section,
};
use crate::model::{
    CableEmulation, Channel, DeviceInfo, DeviceState, Lowcut, MuteConfig, MuteConfigTable,
    SyncSetting,
};

/// Decoder for generation-2 subscription pushes
pub struct ResourceDecoder;

impl MessageDecoder for ResourceDecoder {
    fn name(&self) -> &'static str {
        "scp2-resource"
    }

    fn decode(&self, message: &Map<String, Value>, state: &mut DeviceState) -> DecodeReport {
        let mut report = DecodeReport::new();

        for (path, body) in message {
            let resource = match Resource::parse(path) {
                Ok(resource) => resource,
                Err(e) => {
                    debug!(path = %path, error = %e, "Skipping unroutable resource");
                    report.skip(path.clone());
                    continue;
                }
            };

            if let Some(index) = resource.channel_index() {
                if index >= state.channels().len() {
                    warn!(
                        path = %path,
                        channels = state.channels().len(),
                        "Resource index outside device channel range"
                    );
                    report.skip(path.clone());
                    continue;
                }
            }

            let Some(body) = present(Some(body)) else {
                continue;
            };
            apply_resource(resource, body, state, &mut report);
        }

        report
    }
}

fn apply_resource(resource: Resource, body: &Value, state: &mut DeviceState, report: &mut DecodeReport) {
    match resource {
        Resource::Channel { index, sub } => {
            if let Some(channel) = state.channel_mut(index) {
                decode_channel(sub, body, channel, Section::Channel(index), report);
            }
        }
        Resource::Transmitter { index, sub } => {
            if let Some(channel) = state.channel_mut(index) {
                decode_transmitter(sub, body, channel, Section::Transmitter(index), report);
            }
        }
        Resource::RfChannel { index, sub } => {
            if let Some(channel) = state.channel_mut(index) {
                decode_rf_channel(sub, body, channel, Section::Channel(index), report);
            }
        }
        Resource::SyncSettings { index, ignore } => {
            if let Some(channel) = state.channel_mut(index) {
                decode_sync_settings(ignore, body, channel, Section::Channel(index), report);
            }
        }
        Resource::Device(sub) => decode_device(sub, body, state.device_mut(), report),
        Resource::Rf(sub) => decode_rf(sub, body, state.device_mut(), report),
        Resource::FirmwareUpdateState | Resource::LegacyMode => {}
    }
}

fn decode_channel(
    sub: ChannelResource,
    body: &Value,
    channel: &mut Channel,
    s: Section,
    report: &mut DecodeReport,
) {
    match sub {
        ChannelResource::Main => {
            // Writes nest settings under "channel"; reads may do the same
            let main = body.get("channel").filter(|v| v.is_object()).unwrap_or(body);
            report.apply(s, "name", &mut channel.name, main.get("name"), text);
            report.apply(s, "mute", &mut channel.muted, main.get("mute"), flag);
            report.apply(s, "gain", &mut channel.gain, main.get("gain"), int);
            report.apply(s, "outputLevel", &mut channel.output_level, main.get("outputLevel"), int);
            report.apply(s, "lowCut", &mut channel.low_cut_hz, main.get("lowCut"), int);
        }
        ChannelResource::SignalQuality => {
            report.apply(s, "signalQualityIndicator", &mut channel.rsqi, body.get("value"), int);
        }
        ChannelResource::SignalStrength => {
            report.apply(s, "signalStrengthIndicator", &mut channel.signal_strength, body.get("value"), int);
        }
        ChannelResource::Diversity => {
            report.apply(s, "diversityIndicator", &mut channel.active_antenna, body.get("value"), int);
        }
        ChannelResource::Level => {
            report.apply(s, "level", &mut channel.audio_level, body.get("value"), int);
        }
        ChannelResource::Warnings => match text_list(body) {
            Some(warnings) if channel.warnings.as_ref() != Some(&warnings) => {
                channel.set_warnings(warnings);
                report.mark(s);
            }
            Some(_) => {}
            None => report.skip(format!("{}.warnings", s)),
        },
        ChannelResource::Identify => {
            report.apply(s, "identify", &mut channel.identification, body.get("enabled"), flag);
        }
        ChannelResource::Restore | ChannelResource::ChannelSorting => {}
    }
}

fn decode_transmitter(
    sub: TransmitterResource,
    body: &Value,
    channel: &mut Channel,
    s: Section,
    report: &mut DecodeReport,
) {
    let mate = &mut channel.mate;
    match sub {
        TransmitterResource::Main => {
            report.apply(s, "name", &mut mate.name, body.get("name"), text);
            report.apply(s, "mute", &mut mate.muted, body.get("mute"), flag);
            report.apply(s, "type", &mut mate.kind, body.get("type"), text);
            report.apply(s, "capsule", &mut mate.capsule, body.get("capsule"), text);
            report.apply(s, "trim", &mut mate.trim, body.get("trim"), int);
            report.apply(s, "lowcut", &mut mate.lowcut, body.get("lowcut"), |v| {
                v.as_str().and_then(Lowcut::from_wire)
            });
            report.apply(s, "lock", &mut mate.lock, body.get("lock"), flag);
            report.apply(s, "led", &mut mate.led, body.get("led"), flag);
            report.apply(s, "identification", &mut mate.identification, body.get("identification"), flag);
            report.apply(s, "cableEmulation", &mut mate.cable_emulation, body.get("cableEmulation"), |v| {
                v.as_str().and_then(CableEmulation::from_wire)
            });
        }
        TransmitterResource::Battery => {
            report.apply(s, "battery.gauge", &mut mate.battery_gauge, body.get("gauge"), int);
            report.apply(s, "battery.type", &mut mate.battery_type, body.get("type"), text);
            report.apply(s, "battery.lifetime", &mut mate.battery_lifetime, body.get("lifetime"), int);
        }
        TransmitterResource::Warnings => {
            report.apply(s, "warnings", &mut mate.warnings, Some(body), text_list);
        }
    }
}

fn decode_rf_channel(
    sub: RfChannelResource,
    body: &Value,
    channel: &mut Channel,
    s: Section,
    report: &mut DecodeReport,
) {
    let preset = match sub {
        RfChannelResource::Main => {
            report.apply(s, "frequency", &mut channel.frequency, body.get("frequency"), int);
            present(body.get("presets"))
        }
        RfChannelResource::Frequency => {
            let frequency = body.get("frequency").or(Some(body));
            report.apply(s, "frequency", &mut channel.frequency, frequency, int);
            None
        }
        RfChannelResource::Preset => Some(body),
    };

    if let Some(preset) = preset {
        let target = &mut channel.preset;
        report.apply(s, "presets.type", &mut target.kind, preset.get("type"), text);
        report.apply(s, "presets.bank", &mut target.bank, preset.get("bank"), int);
        report.apply(s, "presets.channel", &mut target.channel, preset.get("channel"), int);
    }
}

fn decode_sync_settings(ignore: bool, body: &Value, channel: &mut Channel, s: Section, report: &mut DecodeReport) {
    if ignore {
        for setting in SyncSetting::ALL {
            let key = setting.scp2();
            report.apply(s, key, channel.sync_ignore.slot_mut(*setting), body.get(key), flag);
        }
        return;
    }

    let values = &mut channel.sync;
    report.apply(s, "sync.muteConfig", &mut values.mute_config, body.get("muteConfig"), |v| {
        v.as_str().and_then(MuteConfig::from_wire)
    });
    report.apply(s, "sync.muteConfigTs", &mut values.mute_config_table, body.get("muteConfigTs"), |v| {
        v.as_str().and_then(MuteConfigTable::from_wire)
    });
    report.apply(s, "sync.cableEmulation", &mut values.cable_emulation, body.get("cableEmulation"), |v| {
        v.as_str().and_then(CableEmulation::from_wire)
    });
    report.apply(s, "sync.lowcut", &mut values.lowcut, body.get("lowcut"), |v| {
        v.as_str().and_then(Lowcut::from_wire)
    });
    report.apply(s, "sync.lock", &mut values.lock, body.get("lock"), flag);
    report.apply(s, "sync.trim", &mut values.trim, body.get("trim"), int);
    report.apply(s, "sync.led", &mut values.led, body.get("led"), flag);
}

fn decode_device(sub: DeviceResource, body: &Value, info: &mut DeviceInfo, report: &mut DecodeReport) {
    let s = Section::Device;
    match sub {
        DeviceResource::Site => {
            report.apply(s, "deviceName", &mut info.name, body.get("deviceName"), text);
            report.apply(s, "location", &mut info.location, body.get("location"), text);
        }
        DeviceResource::Identity => {
            report.apply(s, "serial", &mut info.serial, body.get("serial"), text);
            report.apply(s, "hardwareRevision", &mut info.hardware_revision, body.get("hardwareRevision"), text);
            report.apply(s, "product", &mut info.product, body.get("product"), text);
            report.apply(s, "vendor", &mut info.vendor, body.get("vendor"), text);
            report.apply(s, "version", &mut info.firmware_version, body.get("version"), text);
        }
        DeviceResource::Identification => {
            report.apply(s, "visual", &mut info.identification, body.get("visual"), flag);
        }
        DeviceResource::State => {
            report.apply(s, "state", &mut info.state, body.get("state"), text);
            report.apply(s, "warnings", &mut info.warnings, body.get("warnings"), text_list);
        }
    }
}

fn decode_rf(sub: RfResource, body: &Value, info: &mut DeviceInfo, report: &mut DecodeReport) {
    let s = Section::Device;
    match sub {
        RfResource::Root => {
            report.apply(s, "rf.code", &mut info.frequency_code, body.get("code"), text);
            report.apply(s, "rf.ranges", &mut info.frequency_ranges, body.get("ranges"), |v| {
                Some(v.to_string())
            });
        }
        RfResource::Encryption => {
            report.apply(s, "rf.encryption", &mut info.encryption, body.get("enabled"), flag);
        }
        RfResource::Transmission => {
            report.apply(s, "rf.mode", &mut info.link_density_mode, body.get("mode"), |v| {
                v.as_str().map(|mode| mode == "LinkDensity")
            });
            report.apply(
                s,
                "rf.presetSpacing",
                &mut info.preset_spacing,
                body.get("presetSpacing"),
                text,
            );
        }
    }
}
