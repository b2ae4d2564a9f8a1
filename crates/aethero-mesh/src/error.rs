//! Error types for bus operations

use aethero_core::IdValidationError;
use thiserror::Error;

/// Result type for bus operations
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur during bus operations
#[derive(Error, Debug)]
pub enum MeshError {
    /// Topic name failed validation
    #[error("Invalid topic '{topic}': {source}")]
    InvalidTopic {
        topic: String,
        #[source]
        source: IdValidationError,
    },

    /// Message id is not a UUID
    #[error("Invalid message id '{0}'")]
    InvalidMessageId(String),

    /// Message serialization failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

impl From<serde_json::Error> for MeshError {
    fn from(err: serde_json::Error) -> Self {
        MeshError::SerializationFailed(err.to_string())
    }
}
