//! Tool execution context and backend seams.

use cairn_rs_config::CairnConfig;
use cairn_rs_media::{CallerDefaults, ConverseBackend, ObjectFetcher};
use cairn_rs_memory::{ModelInvoker, VectorStore};
use std::sync::Arc;

/// Builds region-scoped service handles on demand.
///
/// Handles are created per call; nothing is cached between invocations
/// unless an implementation chooses to.
pub trait BackendProvider: Send + Sync {
    fn model_invoker(&self, region: &str) -> Arc<dyn ModelInvoker>;
    fn vector_store(&self, region: &str) -> Arc<dyn VectorStore>;
    fn converse(&self, region: &str) -> Arc<dyn ConverseBackend>;
    fn objects(&self, region: &str) -> Arc<dyn ObjectFetcher>;
}

/// Shared dependencies for tool calls (constructed once, shared via Arc).
pub struct ToolServices {
    /// Effective config: file plus environment overlay.
    pub config: CairnConfig,
    pub backends: Arc<dyn BackendProvider>,
    /// Defaults from the hosting agent or handler.
    pub caller_defaults: CallerDefaults,
}

/// Context passed to tools during execution.
#[derive(Clone)]
pub struct ToolContext {
    /// Request id of the enclosing invocation, when there is one.
    pub request_id: Option<String>,
    /// Tool name for the current invocation.
    pub tool_name: Option<String>,
    pub services: Arc<ToolServices>,
}

impl ToolContext {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self {
            request_id: None,
            tool_name: None,
            services,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn config(&self) -> &CairnConfig {
        &self.services.config
    }
}
