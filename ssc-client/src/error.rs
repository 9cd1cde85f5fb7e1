//! Error types for the SSC transport clients

use thiserror::Error;

/// Errors that can occur while talking to a device
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or HTTP transport error (connect, TLS, timeout, body read)
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The device answered with a non-success status code
    #[error("HTTP {status} for {path}")]
    Status { status: u16, path: String },

    /// The device rejected the configured credentials
    #[error("Authentication rejected for {0}")]
    Unauthorized(String),

    /// A response body could not be parsed as JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// UDP socket error
    #[error("Socket error: {0}")]
    Socket(String),

    /// The configured base URL or request path is not usable
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Socket(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Unauthorized(_) | ClientError::Decode(_) | ClientError::InvalidUrl(_) => {
                false
            }
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        ClientError::Socket(error.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
