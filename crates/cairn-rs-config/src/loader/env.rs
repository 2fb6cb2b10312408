//! Environment variable overlay.

use crate::{CairnConfig, ConfigError, ListStrategy};
use log::debug;

/// Explicit config file path.
pub const CAIRN_CONFIG: &str = "CAIRN_CONFIG";
/// Vector bucket for memory records.
pub const VECTOR_BUCKET_NAME: &str = "VECTOR_BUCKET_NAME";
/// Vector index for memory records.
pub const VECTOR_INDEX_NAME: &str = "VECTOR_INDEX_NAME";
/// Older spelling of [`VECTOR_INDEX_NAME`], consulted when it is unset.
pub const VECTOR_INDEX: &str = "VECTOR_INDEX";
/// Standard AWS region variable.
pub const AWS_REGION: &str = "AWS_REGION";
/// Region set on the deployed Lambda functions; wins over `AWS_REGION` for media.
pub const REGION_NAME: &str = "REGION_NAME";
/// Embedding model id.
pub const EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
/// Classification model id; also enables classification.
pub const CLASSIFICATION_MODEL: &str = "CLASSIFICATION_MODEL";
/// Multimodal model id for media analysis.
pub const MODEL_ID: &str = "MODEL_ID";
/// Memory list strategy (`anchor` or `scan`).
pub const MEMORY_LIST_STRATEGY: &str = "MEMORY_LIST_STRATEGY";

impl CairnConfig {
    /// Apply environment variables from the running process.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply environment variables using an explicit lookup.
    ///
    /// Set, non-blank variables override the corresponding config value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let memory = &mut self.memory;
        if let Some(bucket) = get(VECTOR_BUCKET_NAME) {
            memory.vector_bucket_name = Some(bucket);
        }
        if let Some(index) = get(VECTOR_INDEX_NAME).or_else(|| get(VECTOR_INDEX)) {
            memory.index_name = Some(index);
        }
        if let Some(region) = get(AWS_REGION) {
            memory.region = Some(region);
        }
        if let Some(model) = get(EMBEDDING_MODEL) {
            memory.embedding_model = Some(model);
        }
        if let Some(model) = get(CLASSIFICATION_MODEL) {
            memory.classification.enabled = true;
            memory.classification.model_id = Some(model);
        }
        if let Some(strategy) = get(MEMORY_LIST_STRATEGY) {
            memory.list_strategy = match strategy.to_ascii_lowercase().as_str() {
                "anchor" => ListStrategy::Anchor,
                "scan" => ListStrategy::Scan,
                other => {
                    return Err(ConfigError::InvalidEnv {
                        name: MEMORY_LIST_STRATEGY.to_string(),
                        message: format!("unknown list strategy: {other}"),
                    });
                }
            };
        }

        let media = &mut self.media;
        if let Some(region) = get(REGION_NAME).or_else(|| get(AWS_REGION)) {
            media.region = Some(region);
        }
        if let Some(model) = get(MODEL_ID) {
            media.model_id = Some(model);
        }
        debug!(
            "applied environment overlay (bucket_set={}, index_set={}, media_region_set={})",
            self.memory.vector_bucket_name.is_some(),
            self.memory.index_name.is_some(),
            self.media.region.is_some()
        );
        Ok(())
    }
}
