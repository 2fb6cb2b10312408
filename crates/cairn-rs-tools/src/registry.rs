//! Registry for tool implementations.

use crate::context::ToolContext;
use crate::tool::{Tool, ToolSpec};
use cairn_rs_protocol::{ToolError, success_envelope};
use log::{debug, warn};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory registry for tool implementations.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool by name, replacing any tool of the same name.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        debug!("registering tool (name={})", tool.name());
        self.tools.write().insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// Registered tool names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.read().values().map(|tool| tool.spec()).collect()
    }

    /// Dispatch a call by tool name.
    pub async fn call(
        &self,
        ctx: &ToolContext,
        name: &str,
        args: Value,
    ) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))?;
        let mut ctx = ctx.clone();
        ctx.tool_name = Some(name.to_string());
        tool.call(&ctx, args).await
    }

    /// Dispatch a call and wrap the outcome in a response envelope.
    pub async fn call_enveloped(&self, ctx: &ToolContext, name: &str, args: Value) -> Value {
        match self.call(ctx, name, args).await {
            Ok(payload) => success_envelope(payload),
            Err(err) => {
                warn!("tool call failed (name={}): {}", name, err);
                err.to_envelope()
            }
        }
    }
}
