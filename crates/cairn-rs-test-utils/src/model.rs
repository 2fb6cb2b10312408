use async_trait::async_trait;
use cairn_rs_memory::ModelInvoker;
use cairn_rs_protocol::{RemoteError, RemoteService};
use parking_lot::Mutex;
use serde_json::{Value, json};

/// Normalized a-z letter counts, zero-padded to `dimension`.
///
/// Texts with similar spelling get similar vectors, which is enough to
/// exercise ranking and thresholds deterministically.
pub fn letter_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let mut counts = vec![0f32; 26];
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() {
            counts[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    counts.resize(dimension, 0.0);
    let norm = counts.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut counts {
            *value /= norm;
        }
    }
    counts
}

/// Model invoker answering embedding and classification requests locally.
///
/// Embedding requests (`inputText`) get a [`letter_embedding`]; messages
/// requests get `classification`, or a non-JSON reply when unset.
#[derive(Default)]
pub struct StubModelInvoker {
    requests: Mutex<Vec<(String, Value)>>,
    classification: Mutex<Option<Value>>,
    fail_with: Mutex<Option<String>>,
}

impl StubModelInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classification(self, classification: Value) -> Self {
        *self.classification.lock() = Some(classification);
        self
    }

    /// Fail every following call with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock() = Some(message.into());
    }

    /// `(model_id, body)` of every call so far.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }

    /// Texts sent for embedding, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|(_, body)| body.get("inputText").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl ModelInvoker for StubModelInvoker {
    async fn invoke(&self, model_id: &str, body: &Value) -> Result<Value, RemoteError> {
        self.requests
            .lock()
            .push((model_id.to_string(), body.clone()));
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(RemoteError::new(RemoteService::Model, message));
        }
        if let Some(text) = body.get("inputText").and_then(Value::as_str) {
            let dimension = body
                .get("dimensions")
                .and_then(Value::as_u64)
                .unwrap_or(26) as usize;
            return Ok(json!({ "embedding": letter_embedding(text, dimension) }));
        }
        let reply = match self.classification.lock().clone() {
            Some(classification) => classification.to_string(),
            None => "I cannot classify this.".to_string(),
        };
        Ok(json!({ "content": [{ "type": "text", "text": reply }] }))
    }
}
