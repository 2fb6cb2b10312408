//! Seams to the multimodal inference service and to object storage.

use crate::format::MediaFormat;
use async_trait::async_trait;
use cairn_rs_protocol::RemoteError;

/// Media bytes or a reference the service reads itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Bytes(Vec<u8>),
    /// `s3://bucket/key`, read by the service.
    ObjectUri(String),
}

/// A media attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub format: MediaFormat,
    /// Document name shown to the model; only used for documents.
    pub name: String,
    pub source: MediaSource,
}

/// One user turn: a prompt plus one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverseRequest {
    pub model_id: String,
    pub system_prompt: String,
    pub prompt: String,
    pub attachment: Attachment,
}

/// Single-turn multimodal conversation.
#[async_trait]
pub trait ConverseBackend: Send + Sync {
    /// Text of the model's reply.
    async fn converse(&self, request: ConverseRequest) -> Result<String, RemoteError>;
}

/// Reads whole objects from object storage.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Object size in bytes, without reading the body.
    async fn size(&self, bucket: &str, key: &str) -> Result<u64, RemoteError>;

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError>;
}
