//! Flat, read-by-name view of the device state
//!
//! Host surfaces address values by id (`device_name`, `rx1_muted`,
//! `tx2_batteryGauge`, `bay1_state`). Channel, transmitter and bay ids are
//! one-based. Fields that are still unknown are omitted.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::{Bay, Channel, DeviceInfo, DeviceState, NetworkInterface, SyncSetting};

/// A host-visible value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Text(String),
    Number(i64),
    Flag(bool),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Text(s) => write!(f, "{}", s),
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Default)]
struct Variables(BTreeMap<String, VariableValue>);

impl Variables {
    fn text(&mut self, id: impl Into<String>, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.0.insert(id.into(), VariableValue::Text(value.to_string()));
        }
    }

    fn number(&mut self, id: impl Into<String>, value: Option<i64>) {
        if let Some(value) = value {
            self.0.insert(id.into(), VariableValue::Number(value));
        }
    }

    fn flag(&mut self, id: impl Into<String>, value: Option<bool>) {
        if let Some(value) = value {
            self.0.insert(id.into(), VariableValue::Flag(value));
        }
    }

    fn list<T: ToString>(&mut self, id: impl Into<String>, value: Option<&Vec<T>>) {
        let joined = value.map(|items| {
            items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        });
        self.text(id, joined);
    }
}

impl DeviceState {
    /// Every known field keyed by host variable id
    pub fn variables(&self) -> BTreeMap<String, VariableValue> {
        let mut vars = Variables::default();

        device_variables(&mut vars, self.device());
        for (i, channel) in self.channels().iter().enumerate() {
            channel_variables(&mut vars, i + 1, channel);
        }
        for (i, bay) in self.bays().iter().enumerate() {
            bay_variables(&mut vars, i + 1, bay);
        }

        vars.0
    }

    /// Look up a single variable by id
    pub fn variable(&self, id: &str) -> Option<VariableValue> {
        self.variables().remove(id)
    }
}

fn device_variables(vars: &mut Variables, d: &DeviceInfo) {
    vars.text("device_name", d.name.as_ref());
    vars.text("device_location", d.location.as_ref());
    vars.flag("device_identification", d.identification);
    vars.text("device_version", d.firmware_version.as_ref());
    vars.text("device_serial", d.serial.as_ref());
    vars.number("device_brightness", d.brightness);
    vars.flag("device_lock", d.auto_lock);
    vars.flag("device_encryption", d.encryption);
    vars.flag("device_link_density_mode", d.link_density_mode);
    vars.text("device_frequency_code", d.frequency_code.as_ref());

    network_variables(vars, &d.network);
    vars.flag("device_mdns", d.mdns);

    vars.text("device_dante_version", d.dante.version.as_ref());
    vars.text("dante_interface_mapping", d.dante.port_mapping);
    dante_variables(vars, "primary", &d.dante.primary);
    dante_variables(vars, "secondary", &d.dante.secondary);

    vars.text("device_hardware_revision", d.hardware_revision.as_ref());
    vars.text("device_product", d.product.as_ref());
    vars.text("device_vendor", d.vendor.as_ref());
    vars.text("device_state", d.state.as_ref());
    vars.text("device_frequency_ranges", d.frequency_ranges.as_ref());
    vars.text("device_preset_spacing", d.preset_spacing.as_ref());

    vars.text("device_productlabel", d.product_label.as_ref());
    vars.flag("device_storagemode", d.storage_mode);
    vars.list("device_cascade", d.cascade.as_ref());
    match &d.warnings {
        Some(list) => vars.list("device_warnings", Some(list)),
        None => vars.flag("device_warnings", d.has_warnings),
    }
}

fn network_variables(vars: &mut Variables, n: &NetworkInterface) {
    vars.text("device_ip_dhcp", n.ip.as_ref());
    vars.text("device_ip_manual", n.manual_ip.as_ref());
    vars.text("device_netmask_dhcp", n.netmask.as_ref());
    vars.text("device_manual_netmask", n.manual_netmask.as_ref());
    vars.text("device_gateway_dhcp", n.gateway.as_ref());
    vars.text("device_gateway_manual", n.manual_gateway.as_ref());
    vars.flag("device_dhcp", n.dhcp);
    vars.text("device_mac", n.mac.as_ref());
    vars.text("device_interface", n.name.as_ref());
}

fn dante_variables(vars: &mut Variables, port: &str, n: &NetworkInterface) {
    let id = |field: &str| format!("dante_{}_{}", port, field);
    vars.text(id("interface"), n.name.as_ref());
    vars.text(id("mac"), n.mac.as_ref());
    vars.text(id("ip"), n.ip.as_ref());
    vars.text(id("netmask"), n.netmask.as_ref());
    vars.text(id("gateway"), n.gateway.as_ref());
    vars.text(id("manual_ip"), n.manual_ip.as_ref());
    vars.text(id("manual_netmask"), n.manual_netmask.as_ref());
    vars.text(id("manual_gateway"), n.manual_gateway.as_ref());
    vars.flag(id("dhcp"), n.dhcp);
}

fn channel_variables(vars: &mut Variables, n: usize, c: &Channel) {
    let rx = |field: &str| format!("rx{}_{}", n, field);
    vars.text(rx("name"), c.name.as_ref());
    vars.flag(rx("muted"), c.muted);
    vars.number(rx("gain"), c.gain);
    vars.number(rx("frequency"), c.frequency);
    vars.flag(rx("identification"), c.identification);
    vars.number(rx("activeAntenna"), c.active_antenna);
    vars.number(rx("rsqi"), c.rsqi);
    vars.flag(rx("warnings"), c.has_warnings);
    vars.flag(rx("af_peak"), c.af_peak);
    vars.flag(rx("aes256_error"), c.aes256_error);

    for setting in SyncSetting::ALL {
        let key = setting.scp1().trim_end_matches("_ignore");
        vars.flag(rx(&format!("sync_ignore_{}", key)), c.sync_ignore.get(*setting));
    }
    vars.number(rx("sync_trim"), c.sync.trim);
    vars.text(rx("sync_mute_config"), c.sync.mute_config);
    vars.text(rx("sync_mute_config_ts"), c.sync.mute_config_table);
    vars.text(rx("sync_lowcut"), c.sync.lowcut);
    vars.flag(rx("sync_lock"), c.sync.lock);
    vars.flag(rx("sync_led"), c.sync.led);
    vars.text(rx("sync_cable_emulation"), c.sync.cable_emulation);

    vars.number(rx("signal_strength"), c.signal_strength);
    vars.number(rx("audio_level"), c.audio_level);
    vars.number(rx("output_level"), c.output_level);
    vars.number(rx("low_cut"), c.low_cut_hz);
    vars.text(rx("preset_type"), c.preset.kind.as_ref());
    vars.number(rx("preset_bank"), c.preset.bank);
    vars.number(rx("preset_channel"), c.preset.channel);

    let m = &c.mate;
    let tx = |field: &str| format!("tx{}_{}", n, field);
    vars.number(tx("batteryGauge"), m.battery_gauge);
    vars.number(tx("batteryLifetime"), m.battery_lifetime);
    vars.text(tx("batteryType"), m.battery_type.as_ref());
    vars.text(tx("cableEmulation"), m.cable_emulation);
    vars.text(tx("capsule"), m.capsule.as_ref());
    vars.flag(tx("identification"), m.identification);
    vars.flag(tx("led"), m.led);
    vars.flag(tx("lock"), m.lock);
    vars.text(tx("lowcut"), m.lowcut);
    vars.flag(tx("muted"), m.muted);
    vars.text(tx("name"), m.name.as_ref());
    vars.number(tx("trim"), m.trim);
    vars.text(tx("type"), m.kind.as_ref());
    vars.list(tx("warnings"), m.warnings.as_ref());
}

fn bay_variables(vars: &mut Variables, n: usize, b: &Bay) {
    let bay = |field: &str| format!("bay{}_{}", n, field);
    vars.number(bay("update_progress"), b.update_progress);
    vars.flag(bay("update"), b.update_enabled);
    vars.text(bay("update_error"), b.update_error.as_ref());
    vars.number(bay("timeToFull"), b.time_to_full);
    vars.number(bay("batCycles"), b.battery_cycles);
    vars.number(bay("batGauge"), b.battery_gauge);
    vars.number(bay("batHealth"), b.battery_health);
    vars.text(bay("chargingDevice"), b.charging_device);
    vars.text(bay("txSerial"), b.tx_serial.as_ref());
    vars.text(bay("txVersion"), b.tx_version.as_ref());
    vars.flag(bay("identification"), b.identification);
    vars.text(bay("state"), b.state);
    vars.list(bay("warnings"), b.warnings.as_ref());
    vars.flag(bay("syncError"), b.sync_error);
}
