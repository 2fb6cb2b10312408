use serde::Deserialize;
use serde_json::Value;

/// Accepted Lambda payloads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HandlerEvent {
    /// `{"tool": "s3_vector_memory", "input": {...}}`
    Tool {
        tool: String,
        #[serde(default)]
        input: Value,
    },
    /// `{"prompt": "...", "s3object": "s3://bucket/key"}`
    Multimodal {
        #[serde(default)]
        prompt: Option<String>,
        s3object: String,
    },
}

impl HandlerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerEvent::Tool { .. } => "tool",
            HandlerEvent::Multimodal { .. } => "multimodal",
        }
    }
}
