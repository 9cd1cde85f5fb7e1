//! CHG 70N charger controller (SCPv1)
//!
//! Bay sync settings go out as `{"bays":{"sync_settings":[{"bay_id":k, ...}]}}`,
//! identify as a two-slot array with the untouched bay left `null`.

use std::sync::Arc;

use async_trait::async_trait;
use ewdx_state::domain::{clamp_frequency, clamp_trim, truncate_name};
use ewdx_state::{DeviceModel, StateReader};
use serde_json::{json, Value};
use ssc_codec::encode_str;
use tracing::debug;

use super::{slot_array, BaySync, CommandSink, DeviceControl, NetworkSettings};
use crate::error::Result;

/// [`DeviceControl`] for the CHG 70N network charger
pub struct Scp1Charger {
    sink: Arc<dyn CommandSink>,
    reader: StateReader,
}

impl Scp1Charger {
    pub fn new(sink: Arc<dyn CommandSink>, reader: StateReader) -> Self {
        Self { sink, reader }
    }

    async fn command(&self, path: &str, value: Value) -> Result<()> {
        let document = encode_str(path, value)?;
        debug!(path, "SCPv1 charger command");
        self.sink.send(document).await
    }
}

fn bay_sync_entry(bay: usize, setting: BaySync) -> Value {
    let (key, value) = match setting {
        BaySync::Name(name) => ("name", json!(truncate_name(&name))),
        BaySync::MuteConfig(config) => ("mute_config", json!(config.scp1())),
        BaySync::CableEmulation(mode) => ("cable_emulation", json!(mode.scp1())),
        BaySync::Led(on) => ("led", json!(on)),
        BaySync::Lock(locked) => ("lock", json!(locked)),
        BaySync::Lowcut(lowcut) => ("lowcut", json!(lowcut.scp1())),
        BaySync::LinkDensityMode(on) => ("link_density_mode", json!(on)),
        BaySync::Frequency(khz) => ("frequency", json!(clamp_frequency(khz))),
        BaySync::Trim(db) => ("trim", json!(clamp_trim(db))),
    };
    json!({ "bay_id": bay, key: value })
}

#[async_trait]
impl DeviceControl for Scp1Charger {
    fn model(&self) -> DeviceModel {
        self.reader.model()
    }

    async fn restart(&self) -> Result<()> {
        self.command("/device/restart", json!(true)).await
    }

    async fn set_name(&self, name: &str) -> Result<()> {
        self.command("/device/name", json!(name)).await
    }

    async fn set_location(&self, location: &str) -> Result<()> {
        self.command("/device/location", json!(location)).await
    }

    async fn set_identification(&self, on: bool) -> Result<()> {
        self.command("/device/identification/visual", json!(on))
            .await
    }

    async fn set_network_settings(&self, settings: &NetworkSettings) -> Result<()> {
        self.command("/device/network/ipv4/auto", json!(settings.dhcp))
            .await?;
        self.command("/device/network/mdns", json!(settings.mdns))
            .await?;
        let manual = [
            ("manual_ipaddr", &settings.ip),
            ("manual_netmask", &settings.netmask),
            ("manual_gateway", &settings.gateway),
        ];
        for (key, value) in manual {
            if !value.is_empty() {
                self.command(&format!("/device/network/ipv4/{}", key), json!(value))
                    .await?;
            }
        }
        Ok(())
    }

    async fn set_bay_identify(&self, bay: usize, on: bool) -> Result<()> {
        self.reader.check_bay(bay)?;
        self.command("/bays/identify", slot_array(bay, json!(on)))
            .await
    }

    async fn set_bay_sync(&self, bay: usize, setting: BaySync) -> Result<()> {
        self.reader.check_bay(bay)?;
        debug!(bay, ?setting, "Bay sync setting");
        let document = json!({ "bays": { "sync_settings": [bay_sync_entry(bay, setting)] } });
        self.sink.send(document).await
    }
}
