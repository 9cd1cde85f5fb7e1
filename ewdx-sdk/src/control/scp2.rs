//! Generation-2 receiver controller
//!
//! Writes are REST `PUT`s against resource paths. A rejected write is logged
//! and swallowed; the model catches up from the event stream once the device
//! reports the value it actually holds.

use std::sync::Arc;

use async_trait::async_trait;
use ewdx_state::domain::{
    clamp_frequency, clamp_gain, clamp_trim, nearest_low_cut_hz, nearest_output_level, step_gain,
    truncate_name,
};
use ewdx_state::{
    CableEmulation, DantePortMapping, DeviceModel, Lowcut, MuteConfig, MuteConfigTable,
    PresetType, StateReader, SyncSetting,
};
use serde_json::{json, Value};
use ssc_client::RestTransport;
use ssc_codec::resource::{
    ChannelResource, DeviceResource, RfChannelResource, RfResource,
};
use ssc_codec::Resource;
use tracing::{debug, info, warn};

use super::{DanteInterface, DeviceControl, GainDirection, NetworkSettings};
use crate::error::Result;

/// [`DeviceControl`] for EM 2 / EM 2 Dante / EM 4 on SCPv2
pub struct Scp2Receiver {
    rest: Arc<dyn RestTransport>,
    reader: StateReader,
}

impl Scp2Receiver {
    pub fn new(rest: Arc<dyn RestTransport>, reader: StateReader) -> Self {
        Self { rest, reader }
    }

    async fn put(&self, resource: Resource, body: Value) {
        let path = resource.path();
        debug!(%path, %body, "SCPv2 write");
        if let Err(e) = self.rest.put(&path, &body).await {
            warn!(%path, error = %e, "Write rejected");
        }
    }

    async fn put_channel(&self, channel: usize, sub: ChannelResource, body: Value) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.put(Resource::Channel { index: channel, sub }, body).await;
        Ok(())
    }

    async fn put_rf_channel(&self, channel: usize, sub: RfChannelResource, body: Value) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.put(Resource::RfChannel { index: channel, sub }, body).await;
        Ok(())
    }

    async fn put_sync(&self, channel: usize, ignore: bool, body: Value) -> Result<()> {
        self.reader.check_channel(channel)?;
        self.put(Resource::SyncSettings { index: channel, ignore }, body)
            .await;
        Ok(())
    }

    fn not_on_scp2(&self, operation: &str) {
        info!(operation, "Not available on SCPv2, ignoring");
    }
}

#[async_trait]
impl DeviceControl for Scp2Receiver {
    fn model(&self) -> DeviceModel {
        self.reader.model()
    }

    async fn restart(&self) -> Result<()> {
        self.not_on_scp2("restart");
        Ok(())
    }

    async fn set_brightness(&self, _level: i64) -> Result<()> {
        self.not_on_scp2("set_brightness");
        Ok(())
    }

    async fn set_name(&self, name: &str) -> Result<()> {
        self.put(
            Resource::Device(DeviceResource::Site),
            json!({ "device": { "name": name } }),
        )
        .await;
        Ok(())
    }

    async fn set_location(&self, location: &str) -> Result<()> {
        self.put(
            Resource::Device(DeviceResource::Site),
            json!({ "location": location }),
        )
        .await;
        Ok(())
    }

    async fn set_identification(&self, on: bool) -> Result<()> {
        self.put(
            Resource::Device(DeviceResource::Identification),
            json!({ "visual": on }),
        )
        .await;
        Ok(())
    }

    /// No device-wide lock exists; every channel's sync lock is set instead
    async fn set_auto_lock(&self, on: bool) -> Result<()> {
        for channel in 0..self.model().channel_count() {
            self.set_sync_lock(channel, on).await?;
        }
        Ok(())
    }

    async fn set_encryption(&self, on: bool) -> Result<()> {
        self.put(Resource::Rf(RfResource::Encryption), json!({ "enabled": on }))
            .await;
        Ok(())
    }

    async fn set_link_density_mode(&self, on: bool) -> Result<()> {
        let mode = if on { "LinkDensity" } else { "Standard" };
        self.put(Resource::Rf(RfResource::Transmission), json!({ "mode": mode }))
            .await;
        Ok(())
    }

    async fn set_network_settings(&self, _settings: &NetworkSettings) -> Result<()> {
        self.not_on_scp2("set_network_settings");
        Ok(())
    }

    async fn set_dante_network_settings(
        &self,
        _interface: DanteInterface,
        _settings: &NetworkSettings,
    ) -> Result<()> {
        self.not_on_scp2("set_dante_network_settings");
        Ok(())
    }

    async fn set_dante_port_mapping(&self, _mapping: DantePortMapping) -> Result<()> {
        self.not_on_scp2("set_dante_port_mapping");
        Ok(())
    }

    async fn set_mute(&self, channel: usize, muted: bool) -> Result<()> {
        self.put_channel(channel, ChannelResource::Main, json!({ "channel": { "mute": muted } }))
            .await
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
        let name = truncate_name(&name.to_uppercase());
        self.put_channel(channel, ChannelResource::Main, json!({ "name": name }))
            .await
    }

    async fn set_gain(&self, channel: usize, db: i64) -> Result<()> {
        let gain = clamp_gain(db);
        self.put_channel(channel, ChannelResource::Main, json!({ "channel": { "gain": gain } }))
            .await
    }

    async fn adjust_gain(&self, channel: usize, direction: GainDirection, steps: u32) -> Result<()> {
        self.reader.check_channel(channel)?;
        let current = self
            .reader
            .read(|s| s.channel(channel).and_then(|c| c.gain))
            .unwrap_or(0);
        let gain = step_gain(current, direction == GainDirection::Up, steps);
        self.put_channel(channel, ChannelResource::Main, json!({ "channel": { "gain": gain } }))
            .await
    }

    async fn set_frequency(&self, channel: usize, khz: i64) -> Result<()> {
        let frequency = clamp_frequency(khz);
        self.put_rf_channel(channel, RfChannelResource::Frequency, json!({ "frequency": frequency }))
            .await
    }

    async fn set_channel_identification(&self, channel: usize, on: bool) -> Result<()> {
        self.put_channel(channel, ChannelResource::Identify, json!({ "identify": on }))
            .await
    }

    async fn set_mute_config(&self, channel: usize, config: MuteConfig) -> Result<()> {
        self.put_sync(channel, false, json!({ "muteConfig": config.scp2() }))
            .await
    }

    async fn set_mute_config_table(&self, channel: usize, config: MuteConfigTable) -> Result<()> {
        self.put_sync(channel, false, json!({ "muteConfigTs": config.scp2() }))
            .await
    }

    async fn set_lowcut(&self, channel: usize, lowcut: Lowcut) -> Result<()> {
        self.put_sync(channel, false, json!({ "lowcut": lowcut.scp2() }))
            .await
    }

    async fn set_sync_lock(&self, channel: usize, locked: bool) -> Result<()> {
        self.put_sync(channel, false, json!({ "lock": locked })).await
    }

    async fn set_sync_led(&self, channel: usize, on: bool) -> Result<()> {
        self.put_sync(channel, false, json!({ "led": on })).await
    }

    async fn set_cable_emulation(&self, channel: usize, mode: CableEmulation) -> Result<()> {
        self.put_sync(channel, false, json!({ "cableEmulation": mode.scp2() }))
            .await
    }

    async fn set_sync_trim(&self, channel: usize, db: i64) -> Result<()> {
        self.put_sync(channel, false, json!({ "trim": clamp_trim(db) }))
            .await
    }

    async fn set_sync_ignore(&self, channel: usize, setting: SyncSetting, ignore: bool) -> Result<()> {
        self.put_sync(channel, true, json!({ setting.scp2(): ignore }))
            .await
    }

    async fn set_output_level(&self, channel: usize, db: i64) -> Result<()> {
        let level = nearest_output_level(db);
        self.put_channel(channel, ChannelResource::Main, json!({ "outputLevel": level }))
            .await
    }

    async fn set_low_cut_hz(&self, channel: usize, hz: i64) -> Result<()> {
        let low_cut = nearest_low_cut_hz(hz);
        self.put_channel(channel, ChannelResource::Main, json!({ "channel": { "lowCut": low_cut } }))
            .await
    }

    async fn restore_audio_defaults(&self, channel: usize) -> Result<()> {
        self.put_channel(channel, ChannelResource::Restore, json!({ "mode": "AudioDefault" }))
            .await
    }

    async fn acknowledge_channel_sorting(&self, channel: usize) -> Result<()> {
        self.put_channel(channel, ChannelResource::ChannelSorting, json!({ "sorted": true }))
            .await
    }

    async fn set_frequency_preset(
        &self,
        channel: usize,
        kind: PresetType,
        bank: u32,
        preset: u32,
    ) -> Result<()> {
        let body = json!({ "type": kind.as_str(), "bank": bank, "channel": preset });
        self.put_rf_channel(channel, RfChannelResource::Preset, body)
            .await
    }
}
