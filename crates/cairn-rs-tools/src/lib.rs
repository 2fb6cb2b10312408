//! Agent-callable tools for Cairn and the services they run on.

pub mod builtins;
pub mod context;
pub mod registry;
pub mod services;
pub mod tool;

/// Built-in tool registry and registration helper.
pub use builtins::{
    MediaReaderTool, S3VectorMemoryTool, VideoReaderTool, builtin_tool_registry,
    register_builtin_tools,
};
/// Tool context and backend seams.
pub use context::{BackendProvider, ToolContext, ToolServices};
/// Tool registry type.
pub use registry::ToolRegistry;
/// Per-call service construction.
pub use services::{media_analyzer, memory_service};
/// Tool trait and metadata.
pub use tool::{Tool, ToolSpec};
