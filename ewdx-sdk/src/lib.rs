//! # EW-DX SDK - control adapter for Sennheiser EW-DX devices
//!
//! Keeps a live model of one EW-DX receiver (EM 2, EM 2 Dante, EM 4) or
//! CHG 70N charger and exposes it as typed commands, read-by-name variables
//! and a connection status:
//!
//! ```rust,no_run
//! use ewdx_sdk::{Adapter, AdapterConfig, DeviceModel, GainDirection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ewdx_sdk::SdkError> {
//!     let adapter = Adapter::new();
//!     adapter.configure(AdapterConfig::scp1("192.168.1.20", DeviceModel::Em2)).await?;
//!
//!     let control = adapter.controller().await?;
//!     control.set_mute(0, true).await?;
//!     control.adjust_gain(1, GainDirection::Up, 2).await?;
//!
//!     for (id, value) in adapter.variables().await {
//!         println!("{} = {}", id, value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol generations
//!
//! - **SCPv1** (firmware before 4.0): JSON datagrams on UDP port 45, state
//!   pushed through renewable subscriptions. Liveness is judged from replies.
//! - **SCPv2**: HTTPS REST for writes and one server-sent-event stream for
//!   pushed state, scoped by a session lease and reconnected with backoff.
//!
//! ## Architecture
//!
//! ```text
//! ewdx-sdk (Adapter, DeviceControl)
//!     ↓
//! ewdx-stream (datagram / stream sessions)
//!     ↓                       ↘
//! ssc-client (UDP, HTTPS)    ewdx-state (model, decoders, store)
//!     ↓                       ↙
//! ssc-codec (paths, resources, SSE frames)
//! ```

pub use adapter::{Adapter, DeviceLink};
pub use config::{AdapterConfig, ConfigError};
pub use control::{
    BaySync, CommandSink, DanteInterface, DeviceControl, GainDirection, NetworkSettings,
    Scp1Charger, Scp1Receiver, Scp2Receiver,
};
pub use error::{Result, SdkError};

// Re-export the types hosts need alongside the adapter
pub use ewdx_state::{
    logging, CableEmulation, DantePortMapping, DeviceModel, DeviceState, Lowcut, MuteConfig,
    MuteConfigTable, PresetType, Protocol, StateChange, StateReader, SyncSetting, VariableValue,
};
pub use ewdx_stream::{ConnectionStatus, DatagramTiming, LeaseRequest, StreamTiming};

mod adapter;
mod config;
mod control;
mod error;
