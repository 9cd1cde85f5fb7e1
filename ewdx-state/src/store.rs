//! Device store with batch change notification
//!
//! The [`DeviceStore`] owns the single [`DeviceState`] of an adapter. Exactly
//! one writer (the transport session) applies decoded messages; any number
//! of [`StateReader`] handles read snapshots and subscribe to changes.
//!
//! # Architecture
//!
//! ```text
//! DeviceStore (session task, single writer)
//! ├── state: Arc<RwLock<DeviceState>>
//! └── changes: broadcast::Sender<StateChange>
//!        │
//!        └── StateReader (controller, host surface)
//! ```
//!
//! One inbound message is applied under one write lock and produces at most
//! one [`StateChange::BatchApplied`], so readers never observe half a message.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::debug;

use crate::decoder::{DecodeReport, MessageDecoder, Section};
use crate::error::{DecodeError, Result, StateError};
use crate::model::{DeviceModel, DeviceState};

/// Capacity of the change broadcast channel
const CHANGE_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// StateChange (for broadcast)
// ============================================================================

/// Notification sent to readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// One inbound message was fully applied and changed these sections
    BatchApplied { sections: Vec<Section> },
    /// Every field was returned to unknown (device went offline)
    Reset,
}

// ============================================================================
// DeviceStore
// ============================================================================

/// Owner of the device state; the only handle that can mutate it
#[derive(Debug)]
pub struct DeviceStore {
    state: Arc<RwLock<DeviceState>>,
    changes: broadcast::Sender<StateChange>,
}

impl DeviceStore {
    pub fn new(model: DeviceModel) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(DeviceState::new(model))),
            changes,
        }
    }

    /// Apply one decoded message
    ///
    /// Readers are notified once, and only if some field changed value.
    pub fn apply(&self, decoder: &dyn MessageDecoder, message: &Map<String, Value>) -> DecodeReport {
        let report = {
            let mut state = self.state.write();
            decoder.decode(message, &mut state)
        };

        if !report.skipped().is_empty() {
            debug!(decoder = decoder.name(), skipped = ?report.skipped(), "Ignored fields in message");
        }
        if report.has_changes() {
            let sections = report.sections().collect();
            let _ = self.changes.send(StateChange::BatchApplied { sections });
        }
        report
    }

    /// Parse a raw payload and apply it
    ///
    /// A payload that is not a JSON object is rejected as a whole and leaves
    /// the state untouched.
    pub fn apply_payload(&self, decoder: &dyn MessageDecoder, payload: &[u8]) -> std::result::Result<DecodeReport, DecodeError> {
        let message = ssc_codec::decode_payload(payload)?;
        Ok(self.apply(decoder, &message))
    }

    /// Parse a text payload and apply it
    pub fn apply_text(&self, decoder: &dyn MessageDecoder, text: &str) -> std::result::Result<DecodeReport, DecodeError> {
        let message = ssc_codec::decode_str(text)?;
        Ok(self.apply(decoder, &message))
    }

    /// Return every field to unknown and notify readers
    pub fn reset(&self) {
        self.state.write().reset();
        let _ = self.changes.send(StateChange::Reset);
    }

    /// A read-only handle sharing this store's state
    pub fn reader(&self) -> StateReader {
        StateReader {
            state: Arc::clone(&self.state),
            changes: self.changes.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }
}

// ============================================================================
// StateReader
// ============================================================================

/// Cheap, cloneable read access to the device state
#[derive(Debug, Clone)]
pub struct StateReader {
    state: Arc<RwLock<DeviceState>>,
    changes: broadcast::Sender<StateChange>,
}

impl StateReader {
    /// Run `f` against the current state under a read lock
    pub fn read<R>(&self, f: impl FnOnce(&DeviceState) -> R) -> R {
        f(&self.state.read())
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> DeviceState {
        self.state.read().clone()
    }

    pub fn model(&self) -> DeviceModel {
        self.state.read().model()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Ensure `index` names a channel of this device
    pub fn check_channel(&self, index: usize) -> Result<()> {
        let count = self.state.read().channels().len();
        if index < count {
            Ok(())
        } else {
            Err(StateError::ChannelOutOfRange { index, count })
        }
    }

    /// Ensure `index` names a charging bay of this device
    pub fn check_bay(&self, index: usize) -> Result<()> {
        let count = self.state.read().bays().len();
        if index < count {
            Ok(())
        } else {
            Err(StateError::BayOutOfRange { index, count })
        }
    }
}
