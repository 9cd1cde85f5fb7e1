//! Error types for ewdx-state

use ssc_codec::CodecError;
use thiserror::Error;

/// Result type for ewdx-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// An inbound message that could not be applied
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload was not a JSON object
    #[error("malformed payload: {0}")]
    Payload(#[from] CodecError),
}

/// Errors raised by the device store
#[derive(Debug, Error)]
pub enum StateError {
    #[error("channel {index} out of range (device has {count})")]
    ChannelOutOfRange { index: usize, count: usize },

    #[error("bay {index} out of range (device has {count})")]
    BayOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
