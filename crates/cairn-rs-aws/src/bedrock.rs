//! Bedrock Runtime: raw model invocation and single-turn Converse.

use crate::error::remote;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, DocumentBlock, DocumentFormat, DocumentSource, ImageBlock,
    ImageFormat, ImageSource, Message, S3Location, SystemContentBlock, VideoBlock, VideoFormat,
    VideoSource,
};
use cairn_rs_media::{Attachment, ConverseBackend, ConverseRequest, MediaKind, MediaSource};
use cairn_rs_memory::ModelInvoker;
use cairn_rs_protocol::{RemoteError, RemoteService};
use log::debug;
use serde_json::Value;

/// `InvokeModel` with JSON request and response bodies.
#[derive(Clone)]
pub struct BedrockInvoker {
    client: Client,
}

impl BedrockInvoker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, model_id: &str, body: &Value) -> Result<Value, RemoteError> {
        let payload = serde_json::to_vec(body).map_err(|err| remote(RemoteService::Model, err))?;
        debug!(
            "invoking model (model={}, body_len={})",
            model_id,
            payload.len()
        );
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|err| remote(RemoteService::Model, err))?;
        serde_json::from_slice(output.body().as_ref())
            .map_err(|err| remote(RemoteService::Model, err))
    }
}

/// Single-turn `Converse` with one media attachment.
#[derive(Clone)]
pub struct BedrockConverse {
    client: Client,
}

impl BedrockConverse {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConverseBackend for BedrockConverse {
    async fn converse(&self, request: ConverseRequest) -> Result<String, RemoteError> {
        let failed = |err| remote(RemoteService::Inference, err);
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(attachment_block(&request.attachment)?)
            .content(ContentBlock::Text(request.prompt))
            .build()
            .map_err(failed)?;
        debug!(
            "sending converse request (model={}, format={})",
            request.model_id, request.attachment.format
        );
        let output = self
            .client
            .converse()
            .model_id(&request.model_id)
            .system(SystemContentBlock::Text(request.system_prompt))
            .messages(message)
            .send()
            .await
            .map_err(|err| remote(RemoteService::Inference, err))?;

        let text = output
            .output()
            .and_then(|output| output.as_message().ok())
            .and_then(|message| {
                message
                    .content()
                    .iter()
                    .find_map(|block| block.as_text().ok().cloned())
            });
        text.ok_or_else(|| {
            RemoteError::new(RemoteService::Inference, "response contained no text block")
        })
    }
}

fn attachment_block(attachment: &Attachment) -> Result<ContentBlock, RemoteError> {
    let failed = |err| remote(RemoteService::Inference, err);
    let format = attachment.format.as_str();
    let block = match attachment.format.kind() {
        MediaKind::Video => {
            let source = match &attachment.source {
                MediaSource::ObjectUri(uri) => {
                    VideoSource::S3Location(S3Location::builder().uri(uri).build().map_err(failed)?)
                }
                MediaSource::Bytes(bytes) => VideoSource::Bytes(Blob::new(bytes.clone())),
            };
            ContentBlock::Video(
                VideoBlock::builder()
                    .format(VideoFormat::from(format))
                    .source(source)
                    .build()
                    .map_err(failed)?,
            )
        }
        MediaKind::Image => {
            let source = match &attachment.source {
                MediaSource::ObjectUri(uri) => {
                    ImageSource::S3Location(S3Location::builder().uri(uri).build().map_err(failed)?)
                }
                MediaSource::Bytes(bytes) => ImageSource::Bytes(Blob::new(bytes.clone())),
            };
            ContentBlock::Image(
                ImageBlock::builder()
                    .format(ImageFormat::from(format))
                    .source(source)
                    .build()
                    .map_err(failed)?,
            )
        }
        MediaKind::Document => {
            let source = match &attachment.source {
                MediaSource::ObjectUri(uri) => DocumentSource::S3Location(
                    S3Location::builder().uri(uri).build().map_err(failed)?,
                ),
                MediaSource::Bytes(bytes) => DocumentSource::Bytes(Blob::new(bytes.clone())),
            };
            ContentBlock::Document(
                DocumentBlock::builder()
                    .format(DocumentFormat::from(format))
                    .name(&attachment.name)
                    .source(source)
                    .build()
                    .map_err(failed)?,
            )
        }
    };
    Ok(block)
}
