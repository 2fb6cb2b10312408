//! Embedding client over a hosted embedding model.
//!
//! Input longer than [`MAX_EMBEDDING_CHARS`] is cut from the tail before the
//! request is built. The cut is silent; nothing past it reaches the model.

use crate::invoke::ModelInvoker;
use async_trait::async_trait;
use cairn_rs_protocol::{RemoteError, RemoteService};
use log::debug;
use serde_json::{Value, json};
use std::sync::Arc;

/// Character budget for embedding input.
pub const MAX_EMBEDDING_CHARS: usize = 8000;

/// What an embedding will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingPurpose {
    /// Embedding a record for storage.
    #[default]
    Index,
    /// Embedding a query to search with.
    Retrieval,
}

impl EmbeddingPurpose {
    /// Wire value understood by purpose-aware models.
    pub fn as_str(self) -> &'static str {
        match self {
            EmbeddingPurpose::Index => "GENERIC_INDEX",
            EmbeddingPurpose::Retrieval => "GENERIC_RETRIEVAL",
        }
    }
}

/// Computes embedding vectors for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>, RemoteError>;

    /// Dimensionality of produced vectors.
    fn dimension(&self) -> usize;
}

/// Request/response shape of an embedding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmbeddingFamily {
    /// `amazon.titan-embed-*`: `inputText` in, `embedding` out.
    Titan,
    /// `amazon.nova-*` multimodal embeddings: purpose-aware, `embeddings[0]` out.
    Nova,
}

impl EmbeddingFamily {
    fn for_model(model_id: &str) -> Self {
        if model_id.contains("nova") {
            EmbeddingFamily::Nova
        } else {
            EmbeddingFamily::Titan
        }
    }
}

/// Embedding client backed by a [`ModelInvoker`].
#[derive(Clone)]
pub struct ModelEmbedder {
    invoker: Arc<dyn ModelInvoker>,
    model_id: String,
    dimension: usize,
}

impl ModelEmbedder {
    /// Create an embedder for a model producing `dimension`-sized vectors.
    pub fn new(invoker: Arc<dyn ModelInvoker>, model_id: impl Into<String>, dimension: usize) -> Self {
        Self {
            invoker,
            model_id: model_id.into(),
            dimension,
        }
    }

    /// Model identifier used for requests.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn request_body(&self, text: &str, purpose: EmbeddingPurpose) -> Value {
        match EmbeddingFamily::for_model(&self.model_id) {
            EmbeddingFamily::Titan => json!({
                "inputText": text,
                "dimensions": self.dimension,
                "normalize": true,
            }),
            EmbeddingFamily::Nova => json!({
                "taskType": "SINGLE_EMBEDDING",
                "singleEmbeddingParams": {
                    "embeddingPurpose": purpose.as_str(),
                    "embeddingDimension": self.dimension,
                    "text": { "truncationMode": "END", "value": text },
                },
            }),
        }
    }

    fn parse_response(&self, response: &Value) -> Result<Vec<f32>, RemoteError> {
        let vector = match EmbeddingFamily::for_model(&self.model_id) {
            EmbeddingFamily::Titan => response.get("embedding"),
            EmbeddingFamily::Nova => response
                .get("embeddings")
                .and_then(|items| items.get(0))
                .and_then(|item| item.get("embedding")),
        };
        let values = vector.and_then(Value::as_array).ok_or_else(|| {
            RemoteError::new(
                RemoteService::Embedding,
                format!("response from {} carried no embedding", self.model_id),
            )
        })?;
        values
            .iter()
            .map(|value| {
                value.as_f64().map(|number| number as f32).ok_or_else(|| {
                    RemoteError::new(
                        RemoteService::Embedding,
                        format!("non-numeric embedding value from {}", self.model_id),
                    )
                })
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for ModelEmbedder {
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>, RemoteError> {
        let text = truncate_for_embedding(text);
        let body = self.request_body(text, purpose);
        let response = self
            .invoker
            .invoke(&self.model_id, &body)
            .await
            .map_err(|err| RemoteError::new(RemoteService::Embedding, err.message))?;
        let vector = self.parse_response(&response)?;
        debug!(
            "embedded text (model={}, purpose={:?}, chars={}, dims={})",
            self.model_id,
            purpose,
            text.chars().count(),
            vector.len()
        );
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cut `text` to the first [`MAX_EMBEDDING_CHARS`] characters.
pub fn truncate_for_embedding(text: &str) -> &str {
    match text.char_indices().nth(MAX_EMBEDDING_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, EmbeddingPurpose, ModelEmbedder, truncate_for_embedding};
    use crate::invoke::ModelInvoker;
    use async_trait::async_trait;
    use cairn_rs_protocol::{RemoteError, RemoteService};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingInvoker {
        requests: Mutex<Vec<(String, Value)>>,
        response: Value,
        fail: bool,
    }

    #[async_trait]
    impl ModelInvoker for RecordingInvoker {
        async fn invoke(&self, model_id: &str, body: &Value) -> Result<Value, RemoteError> {
            self.requests
                .lock()
                .expect("lock")
                .push((model_id.to_string(), body.clone()));
            if self.fail {
                return Err(RemoteError::new(RemoteService::Model, "ThrottlingException"));
            }
            Ok(self.response.clone())
        }
    }

    fn titan_invoker() -> Arc<RecordingInvoker> {
        Arc::new(RecordingInvoker {
            response: json!({ "embedding": [0.25, -0.5, 1.0] }),
            ..RecordingInvoker::default()
        })
    }

    #[tokio::test]
    async fn long_input_is_cut_to_budget() {
        let invoker = titan_invoker();
        let embedder = ModelEmbedder::new(invoker.clone(), "amazon.titan-embed-text-v2:0", 3);
        let text = "a".repeat(8000) + &"b".repeat(1000);

        embedder
            .embed(&text, EmbeddingPurpose::Index)
            .await
            .expect("embed");

        let requests = invoker.requests.lock().expect("lock");
        let sent = requests[0].1["inputText"].as_str().expect("input text");
        assert_eq!(sent.len(), 8000);
        assert_eq!(sent, &text[..8000]);
    }

    #[tokio::test]
    async fn titan_request_and_response_shape() {
        let invoker = titan_invoker();
        let embedder = ModelEmbedder::new(invoker.clone(), "amazon.titan-embed-text-v2:0", 1024);

        let vector = embedder
            .embed("hello", EmbeddingPurpose::Retrieval)
            .await
            .expect("embed");

        assert_eq!(vector, vec![0.25, -0.5, 1.0]);
        let requests = invoker.requests.lock().expect("lock");
        assert_eq!(requests[0].0, "amazon.titan-embed-text-v2:0");
        assert_eq!(
            requests[0].1,
            json!({ "inputText": "hello", "dimensions": 1024, "normalize": true })
        );
    }

    #[tokio::test]
    async fn nova_request_carries_purpose() {
        let invoker = Arc::new(RecordingInvoker {
            response: json!({ "embeddings": [{ "embeddingType": "TEXT", "embedding": [0.5, 0.5] }] }),
            ..RecordingInvoker::default()
        });
        let embedder = ModelEmbedder::new(
            invoker.clone(),
            "amazon.nova-2-multimodal-embeddings-v1:0",
            1024,
        );

        let vector = embedder
            .embed("what do I like?", EmbeddingPurpose::Retrieval)
            .await
            .expect("embed");

        assert_eq!(vector, vec![0.5, 0.5]);
        let requests = invoker.requests.lock().expect("lock");
        let params = &requests[0].1["singleEmbeddingParams"];
        assert_eq!(params["embeddingPurpose"], "GENERIC_RETRIEVAL");
        assert_eq!(params["embeddingDimension"], 1024);
        assert_eq!(params["text"]["value"], "what do I like?");
    }

    #[tokio::test]
    async fn remote_errors_pass_through() {
        let invoker = Arc::new(RecordingInvoker {
            fail: true,
            ..RecordingInvoker::default()
        });
        let embedder = ModelEmbedder::new(invoker, "amazon.titan-embed-text-v2:0", 3);
        let err = embedder
            .embed("hello", EmbeddingPurpose::Index)
            .await
            .expect_err("remote failure");
        assert_eq!(err.service, RemoteService::Embedding);
        assert_eq!(err.message, "ThrottlingException");
    }

    #[tokio::test]
    async fn missing_vector_is_remote_error() {
        let invoker = Arc::new(RecordingInvoker {
            response: json!({ "inputTextTokenCount": 3 }),
            ..RecordingInvoker::default()
        });
        let embedder = ModelEmbedder::new(invoker, "amazon.titan-embed-text-v2:0", 3);
        let err = embedder
            .embed("hello", EmbeddingPurpose::Index)
            .await
            .expect_err("no vector");
        assert!(err.message.contains("no embedding"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(8001);
        let cut = truncate_for_embedding(&text);
        assert_eq!(cut.chars().count(), 8000);
        assert_eq!(truncate_for_embedding("short"), "short");
    }
}
