//! Vector index interface.
//!
//! Implementations talk to a remote vector service; the memory service only
//! sees this trait.

use async_trait::async_trait;
use cairn_rs_protocol::RemoteError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bucket/index pair addressed by every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorIndex {
    pub bucket: String,
    pub index: String,
}

impl VectorIndex {
    pub fn new(bucket: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            index: index.into(),
        }
    }
}

impl std::fmt::Display for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

/// Shape of an index created on first use.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub non_filterable_keys: Vec<String>,
}

/// What `ensure_index` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    AlreadyExisted,
    Created,
}

/// A vector with its metadata, as written.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub key: String,
    pub vector: Vec<f32>,
    pub metadata: Value,
}

/// Nearest-neighbour query.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    /// Equality filter over filterable metadata.
    pub filter: Option<Value>,
    pub return_distance: bool,
    pub return_metadata: bool,
}

/// A vector returned by query, get or list.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub key: String,
    /// Absent when distances were not requested or not returned.
    pub distance: Option<f32>,
    /// `Value::Null` when metadata was not returned.
    pub metadata: Value,
}

/// One page of a full index listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorPage {
    pub vectors: Vec<VectorMatch>,
    pub next_token: Option<String>,
}

/// Remote vector index operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the bucket and index when absent. An existing index is success.
    async fn ensure_index(
        &self,
        index: &VectorIndex,
        spec: &IndexSpec,
    ) -> Result<EnsureOutcome, RemoteError>;

    /// Upsert vectors by key.
    async fn put(&self, index: &VectorIndex, records: Vec<VectorRecord>)
    -> Result<(), RemoteError>;

    /// Nearest neighbours of `query.vector`, closest first.
    async fn query(
        &self,
        index: &VectorIndex,
        query: VectorQuery,
    ) -> Result<Vec<VectorMatch>, RemoteError>;

    /// Fetch vectors by key with metadata. Unknown keys are omitted.
    async fn get(&self, index: &VectorIndex, keys: &[String])
    -> Result<Vec<VectorMatch>, RemoteError>;

    /// Delete vectors by key. Unknown keys are ignored.
    async fn delete(&self, index: &VectorIndex, keys: &[String]) -> Result<(), RemoteError>;

    /// One page of every vector in the index, with metadata.
    async fn list(
        &self,
        index: &VectorIndex,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<VectorPage, RemoteError>;
}
