//! Shared wire types for Cairn tools: error kinds and the response envelope.

mod envelope;
mod tool;

pub use envelope::{ResponseStatus, error_envelope, success_envelope};
pub use tool::{RemoteError, RemoteService, ToolError};
