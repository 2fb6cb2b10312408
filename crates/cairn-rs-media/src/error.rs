//! Error types for media analysis.

use cairn_rs_protocol::{RemoteError, ToolError};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Missing or invalid request field, or an unreadable local file.
    #[error("{0}")]
    Validation(String),
    /// Format, scheme, size or prompt the model path cannot handle.
    #[error("{0}")]
    UnsupportedInput(String),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<MediaError> for ToolError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Validation(message) => ToolError::Validation(message),
            MediaError::UnsupportedInput(message) => ToolError::UnsupportedInput(message),
            MediaError::Remote(remote) => ToolError::RemoteService(remote),
        }
    }
}
