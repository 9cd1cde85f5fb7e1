//! Error types for the ewdx-stream crate.

use ssc_client::ClientError;
use ssc_codec::CodecError;

/// Errors surfaced by a transport session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The wire client failed
    #[error("Transport error: {0}")]
    Client(#[from] ClientError),

    /// A subscription document or event frame could not be built or read
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A lease operation was requested while no lease is held
    #[error("No active session lease")]
    NoLease,

    /// Invalid timing configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The session actor is gone
    #[error("Session closed")]
    Closed,

    /// The session actor did not stop cleanly
    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
