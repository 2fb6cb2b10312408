//! Per-call resolution of memory settings.
//!
//! The loaded [`MemoryConfig`] already carries file and environment values;
//! explicit call arguments are layered on top here.

use crate::service::MemorySettings;
use crate::vector::VectorIndex;
use cairn_rs_config::{
    DEFAULT_CLASSIFICATION_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_INDEX_NAME, DEFAULT_REGION,
    DEFAULT_VECTOR_BUCKET, MemoryConfig, resolve_with_fallback,
};

/// Explicit per-call arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryOverrides {
    pub vector_bucket_name: Option<String>,
    pub index_name: Option<String>,
    pub region_name: Option<String>,
    pub embedding_model: Option<String>,
}

/// Everything needed to build a memory service for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTarget {
    pub region: String,
    pub embedding_model: String,
    /// Set when classification is enabled.
    pub classification_model: Option<String>,
    pub settings: MemorySettings,
}

impl MemoryTarget {
    /// Resolve explicit arguments over config over defaults.
    pub fn resolve(config: &MemoryConfig, overrides: &MemoryOverrides) -> Self {
        let bucket = resolve_with_fallback(
            [
                overrides.vector_bucket_name.as_deref(),
                config.vector_bucket_name.as_deref(),
            ],
            DEFAULT_VECTOR_BUCKET,
        );
        let index = resolve_with_fallback(
            [overrides.index_name.as_deref(), config.index_name.as_deref()],
            DEFAULT_INDEX_NAME,
        );
        let region = resolve_with_fallback(
            [overrides.region_name.as_deref(), config.region.as_deref()],
            DEFAULT_REGION,
        );
        let embedding_model = resolve_with_fallback(
            [
                overrides.embedding_model.as_deref(),
                config.embedding_model.as_deref(),
            ],
            DEFAULT_EMBEDDING_MODEL,
        );
        let classification_model = config.classification.enabled.then(|| {
            resolve_with_fallback(
                [config.classification.model_id.as_deref()],
                DEFAULT_CLASSIFICATION_MODEL,
            )
        });
        Self {
            region,
            embedding_model,
            classification_model,
            settings: MemorySettings {
                index: VectorIndex::new(bucket, index),
                dimension: config.dimension,
                key_style: config.key_style,
                list_strategy: config.list_strategy,
                auto_create_index: config.auto_create_index,
            },
        }
    }
}
