use crate::event::HandlerEvent;
use cairn_rs_media::CallerDefaults;
use cairn_rs_protocol::{error_envelope, success_envelope};
use cairn_rs_tools::{ToolContext, ToolRegistry};
use log::{info, warn};
use serde_json::{Map, Value, json};

/// System prompt for multimodal events.
pub const MULTIMODAL_SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes documents, images and videos.
Describe their contents and extract the information relevant to the request.

When answering:
- Present data in a human-readable way
- Highlight important information
- Explain technical terms in plain language
- Reply in the language the user wrote in";

/// Tool that serves multimodal events.
const MULTIMODAL_TOOL: &str = "media_reader";
/// Report fields copied into the multimodal response.
const MULTIMODAL_FIELDS: [&str; 5] = ["text", "report", "model_id", "region", "media_path"];

/// Defaults a deployed function passes to the media tools.
pub fn caller_defaults() -> CallerDefaults {
    CallerDefaults {
        system_prompt: Some(MULTIMODAL_SYSTEM_PROMPT.to_string()),
        ..CallerDefaults::default()
    }
}

/// Routes Lambda events to tools and shapes their envelopes.
pub struct EventHandler {
    registry: ToolRegistry,
    ctx: ToolContext,
}

impl EventHandler {
    pub fn new(registry: ToolRegistry, ctx: ToolContext) -> Self {
        Self { registry, ctx }
    }

    /// Handle one event. Failures are returned as error envelopes.
    pub async fn handle(&self, payload: Value, request_id: Option<&str>) -> Value {
        let event: HandlerEvent = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(err) => {
                warn!("rejecting malformed event: {}", err);
                return error_envelope(
                    "Invalid event: expected {\"prompt\", \"s3object\"} or {\"tool\", \"input\"}",
                );
            }
        };
        let ctx = match request_id {
            Some(request_id) => self.ctx.clone().with_request_id(request_id),
            None => self.ctx.clone(),
        };
        info!(
            "handling event (kind={}, request_id={})",
            event.kind(),
            request_id.unwrap_or("-")
        );

        match event {
            HandlerEvent::Tool { tool, input } => {
                self.registry.call_enveloped(&ctx, &tool, input).await
            }
            HandlerEvent::Multimodal { prompt, s3object } => {
                let mut args = Map::new();
                args.insert("video_path".to_string(), Value::String(s3object));
                if let Some(prompt) = prompt {
                    args.insert("text_prompt".to_string(), Value::String(prompt));
                }
                match self
                    .registry
                    .call(&ctx, MULTIMODAL_TOOL, Value::Object(args))
                    .await
                {
                    Ok(payload) => success_envelope(multimodal_result(&payload)),
                    Err(err) => {
                        warn!("multimodal event failed: {}", err);
                        err.to_envelope()
                    }
                }
            }
        }
    }
}

fn multimodal_result(payload: &Value) -> Value {
    let mut result = Map::new();
    for field in MULTIMODAL_FIELDS {
        result.insert(
            field.to_string(),
            payload.get(field).cloned().unwrap_or(json!(null)),
        );
    }
    Value::Object(result)
}
