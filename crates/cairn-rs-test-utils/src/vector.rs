use async_trait::async_trait;
use cairn_rs_memory::{
    EnsureOutcome, IndexSpec, VectorIndex, VectorMatch, VectorPage, VectorQuery, VectorRecord,
    VectorStore,
};
use cairn_rs_protocol::{RemoteError, RemoteService};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone)]
struct Stored {
    vector: Vec<f32>,
    metadata: Value,
}

/// Vector store kept in memory, keyed by index then record key.
///
/// Query uses cosine distance. Metadata filtering can be switched off to
/// simulate a remote filter that lets foreign records through.
pub struct InMemoryVectorStore {
    indexes: Mutex<BTreeMap<String, BTreeMap<String, Stored>>>,
    ensured: Mutex<Vec<(VectorIndex, IndexSpec)>>,
    filtering: AtomicBool,
    fail_puts: AtomicBool,
    omit_distances: AtomicBool,
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self {
            indexes: Mutex::new(BTreeMap::new()),
            ensured: Mutex::new(Vec::new()),
            filtering: AtomicBool::new(true),
            fail_puts: AtomicBool::new(false),
            omit_distances: AtomicBool::new(false),
        }
    }
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn metadata filtering on or off for following queries.
    pub fn set_filtering(&self, enabled: bool) {
        self.filtering.store(enabled, Ordering::SeqCst);
    }

    /// Make following puts fail with a remote error.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Drop distances from following query results.
    pub fn omit_distances(&self, omit: bool) {
        self.omit_distances.store(omit, Ordering::SeqCst);
    }

    /// Insert a record directly, bypassing embedding.
    pub fn insert(&self, index: &VectorIndex, record: VectorRecord) {
        self.indexes
            .lock()
            .entry(index.to_string())
            .or_default()
            .insert(
                record.key,
                Stored {
                    vector: record.vector,
                    metadata: record.metadata,
                },
            );
    }

    pub fn metadata(&self, index: &VectorIndex, key: &str) -> Option<Value> {
        self.indexes
            .lock()
            .get(&index.to_string())
            .and_then(|records| records.get(key))
            .map(|stored| stored.metadata.clone())
    }

    pub fn len(&self, index: &VectorIndex) -> usize {
        self.indexes
            .lock()
            .get(&index.to_string())
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, index: &VectorIndex) -> bool {
        self.len(index) == 0
    }

    /// Every `ensure_index` call so far.
    pub fn ensured(&self) -> Vec<(VectorIndex, IndexSpec)> {
        self.ensured.lock().clone()
    }
}

fn cosine_distance(left: &[f32], right: &[f32]) -> f32 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|a| a * a).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|b| b * b).sum::<f32>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 1.0;
    }
    1.0 - dot / (left_norm * right_norm)
}

fn matches_filter(metadata: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        Some(conditions) => conditions
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected)),
        None => true,
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_index(
        &self,
        index: &VectorIndex,
        spec: &IndexSpec,
    ) -> Result<EnsureOutcome, RemoteError> {
        self.ensured.lock().push((index.clone(), spec.clone()));
        let mut indexes = self.indexes.lock();
        if indexes.contains_key(&index.to_string()) {
            return Ok(EnsureOutcome::AlreadyExisted);
        }
        indexes.insert(index.to_string(), BTreeMap::new());
        Ok(EnsureOutcome::Created)
    }

    async fn put(&self, index: &VectorIndex, records: Vec<VectorRecord>) -> Result<(), RemoteError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(RemoteError::new(
                RemoteService::VectorStore,
                "ServiceUnavailableException: put failed",
            ));
        }
        for record in records {
            self.insert(index, record);
        }
        Ok(())
    }

    async fn query(
        &self,
        index: &VectorIndex,
        query: VectorQuery,
    ) -> Result<Vec<VectorMatch>, RemoteError> {
        let indexes = self.indexes.lock();
        let Some(records) = indexes.get(&index.to_string()) else {
            return Ok(Vec::new());
        };
        let filtering = self.filtering.load(Ordering::SeqCst);
        let mut matches: Vec<VectorMatch> = records
            .iter()
            .filter(|(_, stored)| match (&query.filter, filtering) {
                (Some(filter), true) => matches_filter(&stored.metadata, filter),
                _ => true,
            })
            .map(|(key, stored)| VectorMatch {
                key: key.clone(),
                distance: Some(cosine_distance(&query.vector, &stored.vector)),
                metadata: stored.metadata.clone(),
            })
            .collect();
        matches.sort_by(|left, right| {
            left.distance
                .unwrap_or(1.0)
                .total_cmp(&right.distance.unwrap_or(1.0))
        });
        matches.truncate(query.top_k);
        if self.omit_distances.load(Ordering::SeqCst) || !query.return_distance {
            for found in &mut matches {
                found.distance = None;
            }
        }
        Ok(matches)
    }

    async fn get(
        &self,
        index: &VectorIndex,
        keys: &[String],
    ) -> Result<Vec<VectorMatch>, RemoteError> {
        let indexes = self.indexes.lock();
        let Some(records) = indexes.get(&index.to_string()) else {
            return Ok(Vec::new());
        };
        Ok(keys
            .iter()
            .filter_map(|key| {
                records.get(key).map(|stored| VectorMatch {
                    key: key.clone(),
                    distance: None,
                    metadata: stored.metadata.clone(),
                })
            })
            .collect())
    }

    async fn delete(&self, index: &VectorIndex, keys: &[String]) -> Result<(), RemoteError> {
        if let Some(records) = self.indexes.lock().get_mut(&index.to_string()) {
            for key in keys {
                records.remove(key);
            }
        }
        Ok(())
    }

    async fn list(
        &self,
        index: &VectorIndex,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<VectorPage, RemoteError> {
        let indexes = self.indexes.lock();
        let Some(records) = indexes.get(&index.to_string()) else {
            return Ok(VectorPage::default());
        };
        let start: usize = page_token
            .as_deref()
            .and_then(|token| token.parse().ok())
            .unwrap_or(0);
        let vectors: Vec<VectorMatch> = records
            .iter()
            .skip(start)
            .take(page_size)
            .map(|(key, stored)| VectorMatch {
                key: key.clone(),
                distance: None,
                metadata: stored.metadata.clone(),
            })
            .collect();
        let end = start + vectors.len();
        Ok(VectorPage {
            vectors,
            next_token: (end < records.len()).then(|| end.to_string()),
        })
    }
}
