use ewdx_state::DeviceModel;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("State error: {0}")]
    State(#[from] ewdx_state::StateError),

    #[error("Session error: {0}")]
    Session(#[from] ewdx_stream::SessionError),

    #[error("Transport error: {0}")]
    Client(#[from] ssc_client::ClientError),

    #[error("Codec error: {0}")]
    Codec(#[from] ssc_codec::CodecError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The device family has no such control
    #[error("{operation} is not supported by {model}")]
    Unsupported {
        operation: &'static str,
        model: DeviceModel,
    },

    /// No device is configured
    #[error("Adapter has no active device")]
    NotConfigured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_names_operation_and_model() {
        let err = SdkError::Unsupported {
            operation: "set_bay_identify",
            model: DeviceModel::Em4,
        };
        assert_eq!(err.to_string(), "set_bay_identify is not supported by em4");
    }
}
