//! Built-in tools bundled with Cairn.

mod media;
mod memory;
mod utils;

use crate::ToolRegistry;
use log::info;
use std::sync::Arc;

pub use media::{MediaReaderTool, VideoReaderTool};
pub use memory::S3VectorMemoryTool;

/// Register all built-in tools with the provided registry.
pub fn register_builtin_tools(registry: &ToolRegistry) {
    registry.register(Arc::new(S3VectorMemoryTool));
    registry.register(Arc::new(MediaReaderTool));
    registry.register(Arc::new(VideoReaderTool));
    info!("registered built-in tools");
}

/// Build a registry pre-populated with built-in tools.
pub fn builtin_tool_registry() -> ToolRegistry {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry);
    registry
}
