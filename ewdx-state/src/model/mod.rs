//! Model types for ewdx-state

mod bay;
mod channel;
mod device;
mod device_model;
pub mod options;
mod state;

pub use bay::Bay;
pub use channel::{Channel, FrequencyPreset, Mate, SyncIgnore, SyncValues};
pub use device::{DanteInfo, DeviceInfo, NetworkInterface};
pub use device_model::{DeviceModel, Protocol};
pub use options::{
    BayState, BayWarning, CableEmulation, ChargingDevice, DantePortMapping, Lowcut, MuteConfig,
    MuteConfigTable, PresetType, SyncSetting,
};
pub use state::DeviceState;
