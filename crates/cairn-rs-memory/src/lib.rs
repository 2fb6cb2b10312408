//! User-isolated vector memory for Cairn.
//!
//! Memories are embedded through a remote model and stored in a remote vector
//! index. This crate owns the request marshalling, the isolation checks, and
//! the post-processing (threshold, sort, truncate) around those calls.

pub mod classify;
pub mod embedding;
pub mod error;
pub mod invoke;
pub mod model;
pub mod presentation;
pub mod service;
pub mod settings;
pub mod vector;

/// Memory classification.
pub use classify::{Classification, Classifier, ModelClassifier};
/// Embedding client.
pub use embedding::{Embedder, EmbeddingPurpose, MAX_EMBEDDING_CHARS, ModelEmbedder};
/// Memory error type.
pub use error::MemoryError;
/// Remote model invocation seam.
pub use invoke::ModelInvoker;
/// Memory record and result models.
pub use model::{
    AutoOutcome, ContextMemory, ContextOutcome, DeleteOutcome, ListOutcome, ListedMemory,
    MemoryHit, MemoryRecord, Owner, RetrieveOutcome, StoreOutcome,
};
/// Memory service.
pub use service::{MemoryService, MemorySettings, check_min_score};
/// Per-call settings resolution.
pub use settings::{MemoryOverrides, MemoryTarget};
/// Vector store interface.
pub use vector::{
    DistanceMetric, EnsureOutcome, IndexSpec, VectorIndex, VectorMatch, VectorPage, VectorQuery,
    VectorRecord, VectorStore,
};
