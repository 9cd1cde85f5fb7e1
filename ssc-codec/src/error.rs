//! Error types for SSC codec operations

use thiserror::Error;

/// Errors that can occur while encoding or decoding SSC documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The command path had no segments (e.g. `""` or `"///"`)
    #[error("Empty command path")]
    EmptyPath,

    /// Inbound payload was not valid UTF-8
    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Inbound payload was not valid JSON
    #[error("JSON deserialization failed: {0}")]
    JsonDeserializationFailed(String),

    /// Inbound payload was valid JSON but not an object
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A REST resource path could not be routed
    #[error("Unroutable resource path: {0}")]
    UnroutablePath(String),
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Short name of a JSON value's kind, used in error messages
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
