//! Tool errors and remote service failures.

use serde_json::Value;
use std::fmt;

/// Managed service a remote call was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteService {
    /// Embedding model invocation.
    Embedding,
    /// Auxiliary model invocation (classification).
    Model,
    /// Vector bucket/index service.
    VectorStore,
    /// Multimodal inference (converse) service.
    Inference,
    /// Object storage.
    ObjectStore,
}

impl fmt::Display for RemoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteService::Embedding => "embedding",
            RemoteService::Model => "model",
            RemoteService::VectorStore => "vector store",
            RemoteService::Inference => "inference",
            RemoteService::ObjectStore => "object store",
        };
        f.write_str(name)
    }
}

/// Failure reported by a managed service, with the upstream message preserved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{service} service error: {message}")]
pub struct RemoteError {
    /// Service that failed.
    pub service: RemoteService,
    /// Upstream error message.
    pub message: String,
}

impl RemoteError {
    /// Build a remote error for a service.
    pub fn new(service: RemoteService, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// Errors returned by tools and handlers.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool name was not found in registry.
    #[error("tool not found: {0}")]
    ToolNotFound(String),
    /// A required field is missing or invalid.
    #[error("{0}")]
    Validation(String),
    /// A managed service call failed.
    #[error(transparent)]
    RemoteService(#[from] RemoteError),
    /// The input cannot be processed (format, size, scheme).
    #[error("{0}")]
    UnsupportedInput(String),
}

impl ToolError {
    /// Render the error as an error response envelope.
    pub fn to_envelope(&self) -> Value {
        crate::error_envelope(self.to_string())
    }
}
