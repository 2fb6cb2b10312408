//! Error types for memory operations.

use cairn_rs_protocol::{RemoteError, ToolError};

/// Errors returned by the memory service and its clients.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// A required field is missing or invalid.
    #[error("{0}")]
    Validation(String),
    /// A managed service call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<MemoryError> for ToolError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::Validation(message) => ToolError::Validation(message),
            MemoryError::Remote(remote) => ToolError::RemoteService(remote),
            MemoryError::Serde(err) => ToolError::Validation(err.to_string()),
        }
    }
}
