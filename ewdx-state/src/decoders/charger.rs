//! Generation-1 charger decoder
//!
//! CHG 70N chargers push a `device` block and a `bays` block. Every bay field
//! is a positional `[bay1, bay2]` array; a `null` slot leaves that bay alone.

use serde_json::{Map, Value};

use crate::decoder::{
    at, flag, int, nonempty, present, slot, text, text_list, DecodeReport, MessageDecoder,
    Section,
};
use crate::model::{Bay, BayState, BayWarning, ChargingDevice, DeviceInfo, DeviceState};

/// Decoder for generation-1 charger messages
pub struct ChargerDecoder;

impl MessageDecoder for ChargerDecoder {
    fn name(&self) -> &'static str {
        "scp1-charger"
    }

    fn decode(&self, message: &Map<String, Value>, state: &mut DeviceState) -> DecodeReport {
        let mut report = DecodeReport::new();

        if let Some(device) = present(message.get("device")) {
            decode_device(device, state.device_mut(), &mut report);
        }

        if let Some(bays) = present(message.get("bays")) {
            for index in 0..state.bays().len() {
                if let Some(bay) = state.bay_mut(index) {
                    decode_bay(bays, index, bay, &mut report);
                }
            }
        }

        report
    }
}

fn decode_device(device: &Value, info: &mut DeviceInfo, report: &mut DecodeReport) {
    let s = Section::Device;
    report.apply(s, "name", &mut info.name, device.get("name"), text);
    report.apply(s, "location", &mut info.location, device.get("location"), text);
    report.apply(s, "identity.product", &mut info.product_label, at(device, &["identity", "product"]), text);
    report.apply(s, "identity.version", &mut info.firmware_version, at(device, &["identity", "version"]), text);
    report.apply(
        s,
        "identification.visual",
        &mut info.identification,
        at(device, &["identification", "visual"]),
        flag,
    );
    report.apply(s, "storage_mode", &mut info.storage_mode, device.get("storage_mode"), flag);
    report.apply(s, "cascade", &mut info.cascade, device.get("cascade"), text_list);
    report.apply(s, "warnings", &mut info.has_warnings, device.get("warnings"), nonempty);

    let Some(network) = present(device.get("network")) else {
        return;
    };
    let n = Section::Network;
    let iface = &mut info.network;
    report.apply(n, "ipv4.ipaddr", &mut iface.ip, at(network, &["ipv4", "ipaddr"]), text);
    report.apply(n, "ipv4.netmask", &mut iface.netmask, at(network, &["ipv4", "netmask"]), text);
    report.apply(n, "ipv4.gateway", &mut iface.gateway, at(network, &["ipv4", "gateway"]), text);
    report.apply(n, "ipv4.manual_ipaddr", &mut iface.manual_ip, at(network, &["ipv4", "manual_ipaddr"]), text);
    report.apply(n, "ipv4.manual_netmask", &mut iface.manual_netmask, at(network, &["ipv4", "manual_netmask"]), text);
    report.apply(n, "ipv4.manual_gateway", &mut iface.manual_gateway, at(network, &["ipv4", "manual_gateway"]), text);
    report.apply(n, "ipv4.auto", &mut iface.dhcp, at(network, &["ipv4", "auto"]), flag);
    report.apply(n, "mdns", &mut info.mdns, network.get("mdns"), flag);
}

fn bay_warnings(value: &Value) -> Option<Vec<BayWarning>> {
    // Unrecognised warning names are dropped rather than failing the whole list
    Some(
        value
            .as_array()?
            .iter()
            .filter_map(|w| w.as_str().and_then(BayWarning::from_wire))
            .collect(),
    )
}

fn decode_bay(bays: &Value, index: usize, bay: &mut Bay, report: &mut DecodeReport) {
    let s = Section::Bay(index);
    let field = |key: &'static str| slot(bays.get(key), index);

    report.apply(s, "update.progress", &mut bay.update_progress, slot(at(bays, &["update", "progress"]), index), int);
    report.apply(s, "update.error", &mut bay.update_error, slot(at(bays, &["update", "error"]), index), text);
    report.apply(s, "update.enable", &mut bay.update_enabled, slot(at(bays, &["update", "enable"]), index), flag);
    report.apply(s, "warnings", &mut bay.warnings, field("warnings"), bay_warnings);
    report.apply(s, "version", &mut bay.tx_version, field("version"), text);
    report.apply(s, "serial", &mut bay.tx_serial, field("serial"), text);
    report.apply(s, "sync_error", &mut bay.sync_error, field("sync_error"), nonempty);
    report.apply(s, "state", &mut bay.state, field("state"), |v| {
        v.as_str().and_then(BayState::from_wire)
    });
    report.apply(s, "identify", &mut bay.identification, field("identify"), flag);
    report.apply(s, "device_type", &mut bay.charging_device, field("device_type"), |v| {
        v.as_str().map(|name| ChargingDevice::from_wire(name).unwrap_or(ChargingDevice::Unknown))
    });
    report.apply(s, "bat_timetofull", &mut bay.time_to_full, field("bat_timetofull"), int);
    report.apply(s, "bat_health", &mut bay.battery_health, field("bat_health"), int);
    report.apply(s, "bat_gauge", &mut bay.battery_gauge, field("bat_gauge"), int);
    report.apply(s, "bat_cycles", &mut bay.battery_cycles, field("bat_cycles"), int);
}
