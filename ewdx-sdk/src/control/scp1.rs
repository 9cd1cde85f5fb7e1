//! Generation-1 receiver controller
//!
//! Commands are slash paths folded into nested JSON and sent as one datagram
//! each. Channel `i` is addressed as `rx{i+1}`.

use std::sync::Arc;

use async_trait::async_trait;
use ewdx_state::domain::{clamp_brightness, clamp_frequency, clamp_gain, clamp_trim, step_gain, truncate_name};
use ewdx_state::{
    CableEmulation, DantePortMapping, DeviceModel, Lowcut, MuteConfig, MuteConfigTable,
    PresetType, StateReader, SyncSetting,
};
use serde_json::{json, Value};
use ssc_codec::encode_str;
use tracing::{debug, info};

use super::{slot_array, CommandSink, DanteInterface, DeviceControl, GainDirection, NetworkSettings};
use crate::error::Result;

/// [`DeviceControl`] for EM 2 / EM 2 Dante / EM 4 on SCPv1
pub struct Scp1Receiver {
    sink: Arc<dyn CommandSink>,
    reader: StateReader,
}

impl Scp1Receiver {
    pub fn new(sink: Arc<dyn CommandSink>, reader: StateReader) -> Self {
        Self { sink, reader }
    }

    async fn command(&self, path: &str, value: Value) -> Result<()> {
        let document = encode_str(path, value)?;
        debug!(path, "SCPv1 command");
        self.sink.send(document).await
    }

    /// `/rx{n}/{tail}` after checking the channel exists
    fn channel_path(&self, channel: usize, tail: &str) -> Result<String> {
        self.reader.check_channel(channel)?;
        Ok(format!("/rx{}/{}", channel + 1, tail))
    }

    async fn channel_command(&self, channel: usize, tail: &str, value: Value) -> Result<()> {
        let path = self.channel_path(channel, tail)?;
        self.command(&path, value).await
    }

    async fn sync_command(&self, channel: usize, key: &str, value: Value) -> Result<()> {
        self.channel_command(channel, &format!("sync_settings/{}", key), value)
            .await
    }

    fn not_on_scp1(&self, operation: &str) {
        info!(operation, "Not available on SCPv1, ignoring");
    }
}

#[async_trait]
impl DeviceControl for Scp1Receiver {
    fn model(&self) -> DeviceModel {
        self.reader.model()
    }

    async fn restart(&self) -> Result<()> {
        self.command("/device/restart", json!(true)).await
    }

    async fn set_brightness(&self, level: i64) -> Result<()> {
        self.command("/device/brightness", json!(clamp_brightness(level)))
            .await
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

    async fn set_auto_lock(&self, on: bool) -> Result<()> {
        self.command("/device/lock", json!(on)).await
    }

    async fn set_encryption(&self, on: bool) -> Result<()> {
        self.command("/device/encryption", json!(on)).await
    }

    async fn set_link_density_mode(&self, on: bool) -> Result<()> {
        self.command("/device/link_density_mode", json!(on)).await
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

    async fn set_dante_network_settings(
        &self,
        interface: DanteInterface,
        settings: &NetworkSettings,
    ) -> Result<()> {
        if !self.model().has_dante() {
            return Err(self.unsupported("set_dante_network_settings"));
        }
        let slot = interface.slot();
        self.command(
            "/device/network/dante/ipv4/auto",
            slot_array(slot, json!(settings.dhcp)),
        )
        .await?;
        let manual = [
            ("manual_ipaddr", &settings.ip),
            ("manual_netmask", &settings.netmask),
            ("manual_gateway", &settings.gateway),
        ];
        for (key, value) in manual {
            if !value.is_empty() {
                self.command(
                    &format!("/device/network/dante/ipv4/{}", key),
                    slot_array(slot, json!(value)),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn set_dante_port_mapping(&self, mapping: DantePortMapping) -> Result<()> {
        if !self.model().has_dante() {
            return Err(self.unsupported("set_dante_port_mapping"));
        }
        self.command("/device/network/dante/interface_mapping", json!(mapping.scp1()))
            .await
    }

    async fn set_mute(&self, channel: usize, muted: bool) -> Result<()> {
        self.channel_command(channel, "mute", json!(muted)).await
    }

    async fn toggle_mute(&self, channel: usize) -> Result<()> {
        self.reader.check_channel(channel)?;
        let muted = self
            .reader
            .read(|s| s.channel(channel).and_then(|c| c.muted))
            .unwrap_or(false);
        self.set_mute(channel, !muted).await
    }

    async fn set_channel_name(&self, channel: usize, name: &str) -> Result<()> {
        self.channel_command(channel, "name", json!(truncate_name(name)))
            .await
    }

    async fn set_gain(&self, channel: usize, db: i64) -> Result<()> {
        self.channel_command(channel, "gain", json!(clamp_gain(db)))
            .await
    }

    async fn adjust_gain(&self, channel: usize, direction: GainDirection, steps: u32) -> Result<()> {
        self.reader.check_channel(channel)?;
        let current = self
            .reader
            .read(|s| s.channel(channel).and_then(|c| c.gain))
            .unwrap_or(0);
        let gain = step_gain(current, direction == GainDirection::Up, steps);
        self.channel_command(channel, "gain", json!(gain)).await
    }

    async fn set_frequency(&self, channel: usize, khz: i64) -> Result<()> {
        self.channel_command(channel, "frequency", json!(clamp_frequency(khz)))
            .await
    }

    async fn set_channel_identification(&self, channel: usize, on: bool) -> Result<()> {
        self.channel_command(channel, "identification/visual", json!(on))
            .await
    }

    async fn set_mute_config(&self, channel: usize, config: MuteConfig) -> Result<()> {
        self.sync_command(channel, "mute_config", json!(config.scp1()))
            .await
    }

    async fn set_mute_config_table(&self, channel: usize, config: MuteConfigTable) -> Result<()> {
        self.sync_command(channel, "mute_config_ts", json!(config.scp1()))
            .await
    }

    async fn set_lowcut(&self, channel: usize, lowcut: Lowcut) -> Result<()> {
        self.sync_command(channel, "lowcut", json!(lowcut.scp1()))
            .await
    }

    async fn set_sync_lock(&self, channel: usize, locked: bool) -> Result<()> {
        self.sync_command(channel, "lock", json!(locked)).await
    }

    async fn set_sync_led(&self, channel: usize, on: bool) -> Result<()> {
        self.sync_command(channel, "led", json!(on)).await
    }

    async fn set_cable_emulation(&self, channel: usize, mode: CableEmulation) -> Result<()> {
        self.sync_command(channel, "cable_emulation", json!(mode.scp1()))
            .await
    }

    async fn set_sync_trim(&self, channel: usize, db: i64) -> Result<()> {
        self.sync_command(channel, "trim", json!(clamp_trim(db)))
            .await
    }

    async fn set_sync_ignore(&self, channel: usize, setting: SyncSetting, ignore: bool) -> Result<()> {
        self.sync_command(channel, setting.scp1(), json!(ignore))
            .await
    }

    async fn set_output_level(&self, channel: usize, _db: i64) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.not_on_scp1("set_output_level");
        Ok(())
    }

    async fn set_low_cut_hz(&self, channel: usize, _hz: i64) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.not_on_scp1("set_low_cut_hz");
        Ok(())
    }

    async fn restore_audio_defaults(&self, channel: usize) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.not_on_scp1("restore_audio_defaults");
        Ok(())
    }

    async fn acknowledge_channel_sorting(&self, channel: usize) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.not_on_scp1("acknowledge_channel_sorting");
        Ok(())
    }

    async fn set_frequency_preset(
        &self,
        channel: usize,
        _kind: PresetType,
        _bank: u32,
        _preset: u32,
    ) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.not_on_scp1("set_frequency_preset");
        Ok(())
    }
}
