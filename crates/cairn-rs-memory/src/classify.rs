//! Structured classification of memory content.
//!
//! Classification is best-effort: any failure produces a local fallback and a
//! warning, never an error.

use crate::invoke::ModelInvoker;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Characters of content kept in a fallback summary.
const FALLBACK_SUMMARY_CHARS: usize = 200;
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const MAX_TOKENS: u32 = 1000;

/// Structured description of a memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Classification {
    pub summary: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub sentiment: String,
    pub topics: Vec<String>,
    pub importance: String,
    pub context: String,
    pub intent: String,
}

impl Classification {
    /// Classification used when the model cannot produce one.
    pub fn fallback(content: &str) -> Self {
        let summary = if content.chars().count() > FALLBACK_SUMMARY_CHARS {
            let head: String = content.chars().take(FALLBACK_SUMMARY_CHARS).collect();
            format!("{head}...")
        } else {
            content.to_string()
        };
        Self {
            summary,
            category: "other".to_string(),
            keywords: Vec::new(),
            sentiment: "neutral".to_string(),
            topics: Vec::new(),
            importance: "medium".to_string(),
            context: "unclassified content".to_string(),
            intent: "unknown".to_string(),
        }
    }
}

/// Produces a classification for memory content.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, content: &str) -> Classification;
}

/// Classifier backed by a chat model speaking the Anthropic messages format.
#[derive(Clone)]
pub struct ModelClassifier {
    invoker: Arc<dyn ModelInvoker>,
    model_id: String,
}

impl ModelClassifier {
    pub fn new(invoker: Arc<dyn ModelInvoker>, model_id: impl Into<String>) -> Self {
        Self {
            invoker,
            model_id: model_id.into(),
        }
    }

    fn request_body(content: &str) -> Value {
        let prompt = format!(
            "Classify the following content as JSON with exactly this structure:\n\
             {{\n\
             \"summary\": \"concise summary of the content\",\n\
             \"category\": \"conversation|question|information|answer|instruction|other\",\n\
             \"keywords\": [\"word1\", \"word2\", \"word3\"],\n\
             \"sentiment\": \"positive|negative|neutral\",\n\
             \"topics\": [\"topic1\", \"topic2\"],\n\
             \"importance\": \"high|medium|low\",\n\
             \"context\": \"situation the content comes from\",\n\
             \"intent\": \"intent of the user\"\n\
             }}\n\n\
             Content to classify:\n{content}\n\n\
             Respond ONLY with valid JSON, no additional text."
        );
        json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }],
        })
    }

    fn parse_response(response: &Value) -> Option<Classification> {
        let text = response
            .get("content")?
            .as_array()?
            .iter()
            .find_map(|block| block.get("text").and_then(Value::as_str))?;
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        serde_json::from_str(&text[start..=end]).ok()
    }
}

#[async_trait]
impl Classifier for ModelClassifier {
    async fn classify(&self, content: &str) -> Classification {
        let body = Self::request_body(content);
        match self.invoker.invoke(&self.model_id, &body).await {
            Ok(response) => match Self::parse_response(&response) {
                Some(classification) => {
                    debug!(
                        "classified memory (model={}, category={})",
                        self.model_id, classification.category
                    );
                    classification
                }
                None => {
                    warn!(
                        "classification response was not valid JSON (model={})",
                        self.model_id
                    );
                    Classification::fallback(content)
                }
            },
            Err(err) => {
                warn!("classification failed (model={}): {}", self.model_id, err);
                Classification::fallback(content)
            }
        }
    }
}
