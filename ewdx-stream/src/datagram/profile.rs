//! What a datagram session asks the device for
//!
//! A profile holds the pre-built documents for one hardware family:
//! subscription requests (renewed periodically, since every subscription
//! carries a lease), `null`-valued static-info reads (serial and firmware are
//! never pushed), and the liveness probe.

use ewdx_state::{DeviceModel, SyncSetting};
use serde_json::Value;
use ssc_codec::subscribe::nest;
use ssc_codec::{encode_str, merge, subscribe_document, template, CodecResult, SubscriptionEntry};

/// Lease lifetime of receiver and bay subscriptions, in seconds
const LONG_LEASE: u32 = 60;

/// Lease lifetime of the charger device block, in seconds
const SHORT_LEASE: u32 = 10;

/// Path read by the liveness probe
const PROBE_PATH: &str = "/device/name";

const RX_LEAVES: &[&str] = &[
    "warnings",
    "divi",
    "frequency",
    "name",
    "identification/visual",
    "gain",
    "mute",
    "sync_settings/trim",
    "sync_settings/mute_config_ts",
    "sync_settings/mute_config",
    "sync_settings/lowcut",
    "sync_settings/lock",
    "sync_settings/led",
    "sync_settings/cable_emulation",
];

const TX_LEAVES: &[&str] = &[
    "battery/gauge",
    "battery/type",
    "battery/lifetime",
    "capsule",
    "mute",
    "warnings",
    "type",
    "trim",
    "name",
    "mute_config_ts",
    "mute_config",
    "lowcut",
    "lock",
    "led",
    "identification",
    "cable_emulation",
];

const RECEIVER_DEVICE_LEAVES: &[&str] = &[
    "/device/encryption",
    "/device/brightness",
    "/device/booster",
    "/device/location",
    "/device/lock",
    "/device/link_density_mode",
    "/device/name",
    "/device/identification",
];

const IPV4_LEAVES: &[&str] = &[
    "/device/network/ipv4/manual_netmask",
    "/device/network/ipv4/manual_ipaddr",
    "/device/network/ipv4/manual_gateway",
    "/device/network/ipv4/netmask",
    "/device/network/ipv4/ipaddr",
    "/device/network/ipv4/gateway",
    "/device/network/ipv4/auto",
    "/device/network/mdns",
];

const DANTE_LEAVES: &[&str] = &[
    "/device/network/dante/identity/version",
    "/device/network/dante/ipv4/netmask",
    "/device/network/dante/ipv4/manual_netmask",
    "/device/network/dante/ipv4/manual_ipaddr",
    "/device/network/dante/ipv4/manual_gateway",
    "/device/network/dante/ipv4/ipaddr",
    "/device/network/dante/ipv4/gateway",
    "/device/network/dante/ipv4/auto",
    "/device/network/dante/ipv4/macs",
    "/device/network/dante/interface_mapping",
];

const CHARGER_DEVICE_LEAVES: &[&str] = &[
    "/device/identification/visual",
    "/device/warnings",
    "/device/storage_mode",
    "/device/name",
    "/device/location",
    "/device/cascade",
];

const BAY_LEAVES: &[&str] = &[
    "/bays/update/progress",
    "/bays/update/error",
    "/bays/warnings",
    "/bays/version",
    "/bays/sync_error",
    "/bays/state",
    "/bays/serial",
    "/bays/identify",
    "/bays/device_type",
    "/bays/bat_timetofull",
    "/bays/bat_health",
    "/bays/bat_gauge",
    "/bays/bat_cycles",
];

const RECEIVER_STATIC: &[&str] = &[
    "/device/identity/version",
    "/device/identity/serial",
    "/device/frequency_code",
    "/device/network/dante/interfaces",
    "/device/network/dante/macs",
    "/device/network/ether/interfaces",
    "/device/network/ether/macs",
];

const CHARGER_STATIC: &[&str] = &["/device/identity/version", "/device/identity/product"];

/// Pre-built request documents for one device family
#[derive(Debug, Clone, PartialEq)]
pub struct DatagramProfile {
    model: DeviceModel,
    subscriptions: Vec<Value>,
    static_queries: Vec<Value>,
    probe: Value,
}

impl DatagramProfile {
    /// Profile matching the hardware model
    pub fn for_model(model: DeviceModel) -> CodecResult<Self> {
        let (subscriptions, statics) = if model.is_charger() {
            (charger_subscriptions()?, CHARGER_STATIC)
        } else {
            (receiver_subscriptions(model)?, RECEIVER_STATIC)
        };

        let static_queries = statics
            .iter()
            .map(|path| encode_str(path, Value::Null))
            .collect::<CodecResult<Vec<_>>>()?;

        Ok(Self {
            model,
            subscriptions,
            static_queries,
            probe: encode_str(PROBE_PATH, Value::Null)?,
        })
    }

    pub fn model(&self) -> DeviceModel {
        self.model
    }

    /// Subscription requests, one datagram each
    pub fn subscriptions(&self) -> &[Value] {
        &self.subscriptions
    }

    /// Reads for fields the device never pushes
    pub fn static_queries(&self) -> &[Value] {
        &self.static_queries
    }

    pub fn probe(&self) -> &Value {
        &self.probe
    }
}

fn rx_template() -> CodecResult<Value> {
    let ignores = SyncSetting::ALL
        .iter()
        .map(|setting| format!("sync_settings/{}", setting.scp1()));
    let leaves = RX_LEAVES.iter().map(|leaf| leaf.to_string()).chain(ignores);
    template(leaves)
}

fn receiver_subscriptions(model: DeviceModel) -> CodecResult<Vec<Value>> {
    let channels = model.channel_count();
    let rx = rx_template()?;
    let tx = template(TX_LEAVES)?;

    let mut documents = Vec::new();

    // rx blocks go out two channels per datagram
    let indices: Vec<usize> = (1..=channels).collect();
    for pair in indices.chunks(2) {
        let mut block = Value::Object(Default::default());
        for n in pair {
            merge(&mut block, nest(&format!("rx{}", n), rx.clone())?);
        }
        documents.push(subscribe_document(vec![SubscriptionEntry::with_lifetime(
            LONG_LEASE, block,
        )]));
    }

    let mut mates = Value::Object(Default::default());
    let mut meters = Value::Object(Default::default());
    for n in 1..=channels {
        merge(&mut mates, nest(&format!("mates/tx{}", n), tx.clone())?);
        merge(
            &mut meters,
            template([format!("/m/rx{}/divi", n), format!("/m/rx{}/rsqi", n)])?,
        );
    }
    documents.push(subscribe_document(vec![
        SubscriptionEntry::with_lifetime(LONG_LEASE, mates),
        SubscriptionEntry::without_lifetime(meters),
    ]));

    documents.push(subscribe_document(vec![SubscriptionEntry::with_lifetime(
        LONG_LEASE,
        template(RECEIVER_DEVICE_LEAVES)?,
    )]));

    let mut network = template(IPV4_LEAVES)?;
    if model.has_dante() {
        merge(&mut network, template(DANTE_LEAVES)?);
    }
    documents.push(subscribe_document(vec![SubscriptionEntry::with_lifetime(
        LONG_LEASE, network,
    )]));

    Ok(documents)
}

fn charger_subscriptions() -> CodecResult<Vec<Value>> {
    let mut device = template(CHARGER_DEVICE_LEAVES)?;
    merge(&mut device, template(IPV4_LEAVES)?);

    // Bay update progress is only reported while explicitly enabled
    let mut bays = template(BAY_LEAVES)?;
    merge(&mut bays, encode_str("/bays/update/enable", Value::Bool(true))?);

    Ok(vec![
        subscribe_document(vec![SubscriptionEntry::with_lifetime(SHORT_LEASE, device)]),
        subscribe_document(vec![SubscriptionEntry::with_lifetime(LONG_LEASE, bays)]),
    ])
}
