//! EW-DX device state
//!
//! Typed model of everything observable on one EW-DX receiver or CHG 70N
//! charger, plus the decoders that keep it in sync with inbound device
//! messages.
//!
//! # Architecture
//!
//! ```text
//! inbound message → MessageDecoder → DeviceStore ─┬─ StateReader::read / snapshot
//!                  (scp1 / scp2)    (single writer) └─ broadcast<StateChange>
//! ```
//!
//! # Example
//!
//! ```rust
//! use ewdx_state::decoders::ReceiverDecoder;
//! use ewdx_state::{DeviceModel, DeviceStore, StateChange};
//!
//! let store = DeviceStore::new(DeviceModel::Em2);
//! let reader = store.reader();
//! let mut changes = reader.subscribe();
//!
//! store.apply_text(&ReceiverDecoder, r#"{"rx1":{"mute":true}}"#).unwrap();
//!
//! assert_eq!(reader.read(|s| s.channel(0).and_then(|c| c.muted)), Some(true));
//! assert!(matches!(changes.try_recv(), Ok(StateChange::BatchApplied { .. })));
//! ```

pub mod decoder;
pub mod decoders;
pub mod domain;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod vars;

pub use decoder::{DecodeReport, MessageDecoder, Section};
pub use error::{DecodeError, Result, StateError};
pub use model::{
    Bay, BayState, BayWarning, CableEmulation, Channel, ChargingDevice, DantePortMapping,
    DeviceInfo, DeviceModel, DeviceState, Lowcut, Mate, MuteConfig, MuteConfigTable,
    NetworkInterface, PresetType, Protocol, SyncSetting,
};
pub use store::{DeviceStore, StateChange, StateReader};
pub use vars::VariableValue;
