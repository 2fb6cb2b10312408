//! Configuration schema for Cairn.

use serde::{Deserialize, Serialize};

/// Vector bucket used when nothing else is configured.
pub const DEFAULT_VECTOR_BUCKET: &str = "multimodal-vector-store";
/// Vector index used when nothing else is configured.
pub const DEFAULT_INDEX_NAME: &str = "multimodal-memory";
/// Region used when nothing else is configured.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Embedding model used when nothing else is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "amazon.titan-embed-text-v2:0";
/// Model used to classify memories before they are embedded.
pub const DEFAULT_CLASSIFICATION_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
/// Multimodal model used for media analysis.
pub const DEFAULT_MEDIA_MODEL: &str = "us.amazon.nova-pro-v1:0";
/// System prompt used for media analysis.
pub const DEFAULT_MEDIA_SYSTEM_PROMPT: &str = "Always answer in the same language you are asked.";
/// Largest payload attached inline to an inference request.
pub const DEFAULT_MAX_INLINE_BYTES: u64 = 20 * 1024 * 1024;

/// Root config for Cairn tools and handlers.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CairnConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

impl CairnConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> CairnConfigBuilder {
        CairnConfigBuilder::new()
    }
}

/// Builder for assembling a `CairnConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct CairnConfigBuilder {
    config: CairnConfig,
}

impl CairnConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: CairnConfig::default(),
        }
    }

    /// Replace the memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the media analysis configuration.
    pub fn media(mut self, media: MediaConfig) -> Self {
        self.config.media = media;
        self
    }

    /// Finalize and return the built `CairnConfig`.
    pub fn build(self) -> CairnConfig {
        self.config
    }
}

/// How memory record keys are generated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
    /// `{owner}_{YYYYmmdd_HHMMSS}_{8 hex chars}`.
    #[default]
    Prefixed,
    /// Random v4 UUID.
    Uuid,
}

/// How the list operation enumerates an owner's memories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListStrategy {
    /// Nearest-neighbour query against a fixed anchor phrase. Approximate.
    #[default]
    Anchor,
    /// Page through the whole index and filter by owner.
    Scan,
}

/// Vector memory settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    #[serde(default)]
    pub vector_bucket_name: Option<String>,
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    #[serde(default = "default_max_context_memories")]
    pub max_context_memories: usize,
    #[serde(default = "default_true")]
    pub auto_inject_context: bool,
    #[serde(default = "default_true")]
    pub auto_create_index: bool,
    #[serde(default)]
    pub key_style: KeyStyle,
    #[serde(default)]
    pub list_strategy: ListStrategy,
    #[serde(default)]
    pub classification: ClassificationConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            vector_bucket_name: None,
            index_name: None,
            region: None,
            embedding_model: None,
            dimension: default_dimension(),
            top_k: default_top_k(),
            min_score: default_min_score(),
            max_context_memories: default_max_context_memories(),
            auto_inject_context: true,
            auto_create_index: true,
            key_style: KeyStyle::default(),
            list_strategy: ListStrategy::default(),
            classification: ClassificationConfig::default(),
        }
    }
}

/// Auxiliary classification applied to memories before embedding.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClassificationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub model_id: Option<String>,
}

/// Media analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_max_inline_bytes")]
    pub max_inline_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            region: None,
            model_id: None,
            system_prompt: None,
            max_inline_bytes: default_max_inline_bytes(),
        }
    }
}

fn default_dimension() -> usize {
    1024
}

fn default_top_k() -> usize {
    20
}

fn default_min_score() -> f32 {
    0.1
}

fn default_max_context_memories() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_max_inline_bytes() -> u64 {
    DEFAULT_MAX_INLINE_BYTES
}
