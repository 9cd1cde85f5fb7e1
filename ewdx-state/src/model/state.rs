//! The complete device snapshot

use serde::Serialize;

use super::bay::Bay;
use super::channel::Channel;
use super::device::DeviceInfo;
use super::device_model::DeviceModel;

/// Typed snapshot of everything observable on one device
///
/// Channel and bay arrays are sized once from the [`DeviceModel`] and never
/// resized; indices are zero-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    model: DeviceModel,
    device: DeviceInfo,
    channels: Box<[Channel]>,
    bays: Box<[Bay]>,
}

impl DeviceState {
    /// Empty state with every field unknown
    pub fn new(model: DeviceModel) -> Self {
        Self {
            model,
            device: DeviceInfo::default(),
            channels: vec![Channel::default(); model.channel_count()].into_boxed_slice(),
            bays: vec![Bay::default(); model.bay_count()].into_boxed_slice(),
        }
    }

    pub fn model(&self) -> DeviceModel {
        self.model
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut DeviceInfo {
        &mut self.device
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub fn bays(&self) -> &[Bay] {
        &self.bays
    }

    pub fn bay(&self, index: usize) -> Option<&Bay> {
        self.bays.get(index)
    }

    pub fn bay_mut(&mut self, index: usize) -> Option<&mut Bay> {
        self.bays.get_mut(index)
    }

    /// Return every field to unknown, keeping the array shapes
    pub fn reset(&mut self) {
        self.device = DeviceInfo::default();
        self.channels.iter_mut().for_each(|c| *c = Channel::default());
        self.bays.iter_mut().for_each(|b| *b = Bay::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_follow_model() {
        let state = DeviceState::new(DeviceModel::Em4);
        assert_eq!(state.channels().len(), 4);
        assert!(state.bays().is_empty());

        let charger = DeviceState::new(DeviceModel::Chg70n);
        assert!(charger.channels().is_empty());
        assert_eq!(charger.bays().len(), 2);
    }

    #[test]
    fn test_reset_clears_fields_but_keeps_shape() {
        let mut state = DeviceState::new(DeviceModel::Em2);
        state.device_mut().name = Some("STAGE".into());
        state.channel_mut(1).unwrap().muted = Some(true);

        state.reset();

        assert_eq!(state, DeviceState::new(DeviceModel::Em2));
        assert_eq!(state.channels().len(), 2);
        assert!(state.channel_mut(2).is_none());
    }
}
