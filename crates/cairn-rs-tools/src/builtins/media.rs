//! Media and video analysis tools.

use crate::builtins::utils::{parse_args, to_payload, with_field};
use crate::services::media_analyzer;
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use cairn_rs_media::{AnalysisOverrides, AnalysisRequest, AnalysisSettings, MediaKind};
use cairn_rs_protocol::ToolError;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_MEDIA_PROMPT: &str = "Describe what you see in this file";
const DEFAULT_VIDEO_PROMPT: &str = "Describe what you see in this video";

/// Analyze an image, document or video with a multimodal model.
#[derive(Debug, Default)]
pub struct MediaReaderTool;

/// Analyze a video with a multimodal model.
#[derive(Debug, Default)]
pub struct VideoReaderTool;

#[async_trait]
impl Tool for MediaReaderTool {
    fn name(&self) -> &str {
        "media_reader"
    }

    fn description(&self) -> &str {
        "Analyze an image (png, jpeg, gif, webp), document (pdf, csv, doc, docx, xls, xlsx, html, txt, md) or video (mp4, mov, avi, mkv, webm) from a local path or s3:// URI"
    }

    fn args_schema(&self) -> Value {
        media_args_schema("Local path or s3://bucket/key of the file to analyze.")
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        analyze(ctx, args, None, DEFAULT_MEDIA_PROMPT).await
    }
}

#[async_trait]
impl Tool for VideoReaderTool {
    fn name(&self) -> &str {
        "video_reader"
    }

    fn description(&self) -> &str {
        "Analyze video content (mp4, mov, avi, mkv, webm) from a local path or s3:// URI. Visual content only; Nova models cannot identify people"
    }

    fn args_schema(&self) -> Value {
        media_args_schema("Local path or s3://bucket/key of the video.")
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        analyze(ctx, args, Some(MediaKind::Video), DEFAULT_VIDEO_PROMPT).await
    }
}

async fn analyze(
    ctx: &ToolContext,
    args: Value,
    only: Option<MediaKind>,
    default_prompt: &str,
) -> Result<Value, ToolError> {
    let input: MediaArgs = parse_args(args)?;
    let media_path = input
        .video_path
        .clone()
        .or_else(|| input.s3object.clone())
        .filter(|path| !path.trim().is_empty())
        .ok_or_else(|| ToolError::Validation("video_path is required".to_string()))?;
    let prompt = input
        .text_prompt
        .clone()
        .filter(|prompt| !prompt.trim().is_empty())
        .unwrap_or_else(|| default_prompt.to_string());

    let settings = AnalysisSettings::resolve(
        &input.overrides(),
        &ctx.config().media,
        &ctx.services.caller_defaults,
    );
    info!(
        "media tool call (model={}, region={}, path_len={})",
        settings.model_id,
        settings.region,
        media_path.len()
    );
    let analyzer = media_analyzer(&ctx.services, &settings.region);
    let report = analyzer
        .analyze(
            &AnalysisRequest {
                media_path,
                prompt,
                only,
            },
            &settings,
        )
        .await?;
    let payload = to_payload(&report)?;
    Ok(with_field(payload, "report", Value::String(report.render())))
}

fn media_args_schema(path_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "video_path": { "type": "string", "description": path_description },
            "s3object": { "type": "string", "description": "Alias of video_path." },
            "text_prompt": { "type": "string", "description": "Question or instruction for the analysis." },
            "model_id": { "type": "string", "description": "Inference model id." },
            "region": { "type": "string", "description": "Region of the inference service." },
            "system_prompt": { "type": "string", "description": "System prompt for the analysis." },
        },
    })
}

/// Arguments shared by the media tools.
#[derive(Debug, Deserialize)]
struct MediaArgs {
    #[serde(default)]
    video_path: Option<String>,
    #[serde(default)]
    s3object: Option<String>,
    #[serde(default)]
    text_prompt: Option<String>,
    #[serde(default)]
    model_id: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    system_prompt: Option<String>,
}

impl MediaArgs {
    fn overrides(&self) -> AnalysisOverrides {
        AnalysisOverrides {
            model_id: self.model_id.clone(),
            region: self.region.clone(),
            system_prompt: self.system_prompt.clone(),
        }
    }
}
