use crate::backends::StubBackends;
use cairn_rs_config::CairnConfig;
use cairn_rs_media::CallerDefaults;
use cairn_rs_tools::{ToolContext, ToolServices};
use std::sync::Arc;

pub fn base_tool_context(backends: Arc<StubBackends>, config: CairnConfig) -> ToolContext {
    ToolContext::new(Arc::new(ToolServices {
        config,
        backends,
        caller_defaults: CallerDefaults::default(),
    }))
    .with_request_id("test-request")
}
