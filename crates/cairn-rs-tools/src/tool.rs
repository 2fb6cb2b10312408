//! Tool trait definition and metadata spec.

use crate::context::ToolContext;
use async_trait::async_trait;
use cairn_rs_protocol::ToolError;
use serde_json::Value;
use std::fmt::Debug;

/// Tool metadata for discovery and schema presentation.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema for tool arguments.
    pub args_schema: Value,
}

/// Interface for executable tools.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema for tool arguments.
    fn args_schema(&self) -> Value;

    /// Invoke the tool. The returned payload is wrapped in a success envelope
    /// by the caller.
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args_schema: self.args_schema(),
        }
    }
}
