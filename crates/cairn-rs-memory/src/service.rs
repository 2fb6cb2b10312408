//! Memory operations over an embedder and a vector store.
//!
//! Every read filters on the owner field remotely and then re-checks the
//! stored owner locally; a record of another owner is never returned even if
//! the remote filter misbehaves.

use crate::classify::Classifier;
use crate::embedding::{Embedder, EmbeddingPurpose};
use crate::error::MemoryError;
use crate::model::{
    AutoOutcome, CONTENT_KEY, ContextMemory, ContextOutcome, DeleteOutcome, ListOutcome,
    ListedMemory, MemoryHit, MemoryRecord, NON_FILTERABLE_KEYS, Owner, RetrieveOutcome,
    StoreOutcome, TIMESTAMP_KEY, metadata_classification, metadata_str,
};
use crate::vector::{
    DistanceMetric, EnsureOutcome, IndexSpec, VectorIndex, VectorMatch, VectorQuery, VectorRecord,
    VectorStore,
};
use cairn_rs_config::{KeyStyle, ListStrategy};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Phrase embedded to enumerate memories with the anchor strategy.
pub const LIST_ANCHOR_QUERY: &str = "user memories";
/// Query used by auto-context when the caller gives no input.
pub const DEFAULT_CONTEXT_QUERY: &str =
    "user preferences, conversation history, important information";
/// Floor of the relaxed auto-context threshold.
const CONTEXT_MIN_THRESHOLD: f32 = 0.1;
/// How far auto-context relaxes the caller's threshold.
const CONTEXT_RELAXATION: f32 = 0.2;
/// Context entries joined into the summary.
const CONTEXT_SUMMARY_ENTRIES: usize = 5;
/// Page size used by the scan list strategy.
const SCAN_PAGE_SIZE: usize = 500;

/// Resolved settings for one memory service.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySettings {
    pub index: VectorIndex,
    pub dimension: usize,
    pub key_style: KeyStyle,
    pub list_strategy: ListStrategy,
    /// Create bucket and index on first use.
    pub auto_create_index: bool,
}

/// Stateless memory operations scoped to one vector index.
#[derive(Clone)]
pub struct MemoryService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    classifier: Option<Arc<dyn Classifier>>,
    settings: MemorySettings,
}

impl MemoryService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        settings: MemorySettings,
    ) -> Self {
        Self {
            embedder,
            store,
            classifier: None,
            settings,
        }
    }

    /// Classify content before storing it.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn settings(&self) -> &MemorySettings {
        &self.settings
    }

    /// Create the bucket and index when auto-creation is enabled.
    pub async fn ensure_ready(&self) -> Result<(), MemoryError> {
        if !self.settings.auto_create_index {
            return Ok(());
        }
        let spec = IndexSpec {
            dimension: self.settings.dimension,
            metric: DistanceMetric::Cosine,
            non_filterable_keys: NON_FILTERABLE_KEYS.iter().map(|key| key.to_string()).collect(),
        };
        let outcome = self.store.ensure_index(&self.settings.index, &spec).await?;
        if outcome == EnsureOutcome::Created {
            info!(
                "created vector index (index={}, dimension={})",
                self.settings.index, self.settings.dimension
            );
        }
        Ok(())
    }

    /// Embed and store one memory; returns its key.
    ///
    /// Embedding happens before the write. A failed write leaves nothing
    /// behind, but a failure after a successful write is not rolled back.
    pub async fn store(
        &self,
        content: &str,
        owner: &Owner,
        extra: Option<Map<String, Value>>,
    ) -> Result<StoreOutcome, MemoryError> {
        if content.trim().is_empty() {
            return Err(MemoryError::Validation("content is required".to_string()));
        }
        let classification = match &self.classifier {
            Some(classifier) => Some(classifier.classify(content).await),
            None => None,
        };
        let vector = self.embedder.embed(content, EmbeddingPurpose::Index).await?;
        let now = Utc::now();
        let record = MemoryRecord {
            key: memory_key(self.settings.key_style, owner, now),
            owner: owner.clone(),
            content: content.to_string(),
            timestamp: now.to_rfc3339(),
            classification,
            extra: extra.unwrap_or_default(),
        };
        let metadata = record.metadata()?;
        self.store
            .put(
                &self.settings.index,
                vec![VectorRecord {
                    key: record.key.clone(),
                    vector,
                    metadata,
                }],
            )
            .await?;
        info!(
            "memory stored (owner={}, key={}, chars={})",
            owner,
            record.key,
            content.chars().count()
        );
        Ok(StoreOutcome {
            memory_key: record.key,
            message: "Memory stored successfully".to_string(),
            classification: record.classification,
        })
    }

    /// Owner-scoped similarity search, best match first.
    pub async fn retrieve(
        &self,
        query: &str,
        owner: &Owner,
        top_k: usize,
        min_score: f32,
    ) -> Result<RetrieveOutcome, MemoryError> {
        if query.trim().is_empty() {
            return Err(MemoryError::Validation("query is required".to_string()));
        }
        if top_k == 0 {
            return Err(MemoryError::Validation(
                "top_k must be greater than 0".to_string(),
            ));
        }
        check_min_score(min_score)?;
        let matches = self.owned_matches(query, owner, top_k).await?;
        let mut scored: Vec<(f64, MemoryHit)> = matches
            .into_iter()
            .map(|found| {
                let score = similarity(&found);
                let hit = MemoryHit {
                    memory: metadata_str(&found.metadata, CONTENT_KEY),
                    created_at: metadata_str(&found.metadata, TIMESTAMP_KEY),
                    classification: metadata_classification(&found.metadata),
                    similarity: round3(score),
                    id: found.key,
                };
                (score, hit)
            })
            .filter(|(score, _)| *score >= f64::from(min_score))
            .collect();
        scored.sort_by(|left, right| right.0.total_cmp(&left.0));
        let total_found = scored.len();
        let memories: Vec<MemoryHit> = scored
            .into_iter()
            .take(top_k)
            .map(|(_, hit)| hit)
            .collect();
        debug!(
            "memory retrieve (owner={}, top_k={}, min_score={}, found={}, returned={})",
            owner,
            top_k,
            min_score,
            total_found,
            memories.len()
        );
        Ok(RetrieveOutcome {
            memories,
            total_found,
            query: query.to_string(),
        })
    }

    /// An owner's memories, newest first.
    pub async fn list(&self, owner: &Owner, top_k: usize) -> Result<ListOutcome, MemoryError> {
        if top_k == 0 {
            return Err(MemoryError::Validation(
                "top_k must be greater than 0".to_string(),
            ));
        }
        let (matches, approximate) = match self.settings.list_strategy {
            ListStrategy::Anchor => (
                self.owned_matches(LIST_ANCHOR_QUERY, owner, top_k).await?,
                true,
            ),
            ListStrategy::Scan => (self.scan_owned(owner).await?, false),
        };
        let mut memories: Vec<ListedMemory> = matches
            .into_iter()
            .map(|found| {
                let created_at = metadata_str(&found.metadata, TIMESTAMP_KEY);
                ListedMemory {
                    memory: metadata_str(&found.metadata, CONTENT_KEY),
                    updated_at: created_at.clone(),
                    created_at,
                    classification: metadata_classification(&found.metadata),
                    id: found.key,
                }
            })
            .collect();
        memories.sort_by(|left, right| {
            (parse_timestamp(&right.created_at), &right.created_at)
                .cmp(&(parse_timestamp(&left.created_at), &left.created_at))
        });
        memories.truncate(top_k);
        debug!(
            "memory list (owner={}, strategy={:?}, returned={})",
            owner,
            self.settings.list_strategy,
            memories.len()
        );
        Ok(ListOutcome {
            total_found: memories.len(),
            memories,
            approximate,
        })
    }

    /// Delete a memory by key.
    ///
    /// Deleting a missing key succeeds. With an owner, the record is fetched
    /// first and a record of another owner is refused.
    pub async fn delete(
        &self,
        memory_key: &str,
        owner: Option<&Owner>,
    ) -> Result<DeleteOutcome, MemoryError> {
        let memory_key = memory_key.trim();
        if memory_key.is_empty() {
            return Err(MemoryError::Validation("memory_key is required".to_string()));
        }
        let keys = vec![memory_key.to_string()];
        let existed = match owner {
            Some(owner) => {
                let found = self.store.get(&self.settings.index, &keys).await?;
                match found.iter().find(|entry| entry.key == memory_key) {
                    Some(entry) if !owner.matches(&entry.metadata) => {
                        warn!(
                            "refused delete of memory owned by someone else (owner={}, key={})",
                            owner, memory_key
                        );
                        return Err(MemoryError::Validation(format!(
                            "memory {memory_key} does not belong to {owner}"
                        )));
                    }
                    Some(_) => Some(true),
                    None => Some(false),
                }
            }
            None => None,
        };
        if existed != Some(false) {
            self.store.delete(&self.settings.index, &keys).await?;
        }
        info!("memory deleted (key={}, existed={:?})", memory_key, existed);
        let message = match existed {
            Some(false) => format!("Memory {memory_key} not found; nothing to delete"),
            _ => format!("Memory {memory_key} deleted successfully"),
        };
        Ok(DeleteOutcome {
            memory_key: memory_key.to_string(),
            message,
            existed,
        })
    }

    /// Context for personalising the next turn.
    ///
    /// Uses a relaxed threshold of `max(0.1, min_score - 0.2)`.
    pub async fn auto_context(
        &self,
        owner: &Owner,
        current_input: Option<&str>,
        max_memories: usize,
        min_score: f32,
    ) -> Result<ContextOutcome, MemoryError> {
        if max_memories == 0 {
            return Err(MemoryError::Validation(
                "max_context_memories must be greater than 0".to_string(),
            ));
        }
        check_min_score(min_score)?;
        let query = current_input
            .map(str::trim)
            .filter(|input| !input.is_empty())
            .unwrap_or(DEFAULT_CONTEXT_QUERY);
        let threshold = f64::from(context_threshold(min_score));
        let matches = self.owned_matches(query, owner, max_memories).await?;
        let mut scored: Vec<(f64, ContextMemory)> = matches
            .into_iter()
            .map(|found| {
                let score = similarity(&found);
                let entry = ContextMemory {
                    content: metadata_str(&found.metadata, CONTENT_KEY),
                    similarity: round3(score),
                    timestamp: metadata_str(&found.metadata, TIMESTAMP_KEY),
                };
                (score, entry)
            })
            .filter(|(score, _)| *score >= threshold)
            .collect();
        scored.sort_by(|left, right| right.0.total_cmp(&left.0));
        let context_memories: Vec<ContextMemory> =
            scored.into_iter().map(|(_, entry)| entry).collect();
        let summary = if context_memories.is_empty() {
            format!("New user interaction for {}", owner.id())
        } else {
            context_memories
                .iter()
                .take(CONTEXT_SUMMARY_ENTRIES)
                .map(|entry| format!("- {}", entry.content))
                .collect::<Vec<_>>()
                .join("\n")
        };
        debug!(
            "memory auto context (owner={}, threshold={:.3}, found={})",
            owner,
            threshold,
            context_memories.len()
        );
        Ok(ContextOutcome {
            total_context: context_memories.len(),
            context_memories,
            summary,
        })
    }

    /// Retrieve for `query` first, then store `content`.
    ///
    /// The retrieval never sees the memory stored by the same call.
    pub async fn auto_store_and_retrieve(
        &self,
        owner: &Owner,
        content: Option<&str>,
        query: Option<&str>,
        top_k: usize,
        min_score: f32,
        extra: Option<Map<String, Value>>,
    ) -> Result<AutoOutcome, MemoryError> {
        let query = query.map(str::trim).filter(|query| !query.is_empty());
        let content = content.filter(|content| !content.trim().is_empty());
        let retrieved = match query {
            Some(query) => Some(self.retrieve(query, owner, top_k, min_score).await?),
            None => None,
        };
        let stored = match content {
            Some(content) => Some(self.store(content, owner, extra).await?),
            None => None,
        };
        let context_memories = retrieved
            .as_ref()
            .map(|outcome| outcome.memories.clone())
            .unwrap_or_default();
        Ok(AutoOutcome {
            stored,
            retrieved,
            context_memories,
        })
    }

    /// Embed `text`, query with the owner filter, drop foreign records.
    async fn owned_matches(
        &self,
        text: &str,
        owner: &Owner,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>, MemoryError> {
        let vector = self.embedder.embed(text, EmbeddingPurpose::Retrieval).await?;
        let matches = self
            .store
            .query(
                &self.settings.index,
                VectorQuery {
                    vector,
                    top_k,
                    filter: Some(owner.filter()),
                    return_distance: true,
                    return_metadata: true,
                },
            )
            .await?;
        Ok(retain_owned(matches, owner))
    }

    /// Page through the whole index keeping the owner's records.
    async fn scan_owned(&self, owner: &Owner) -> Result<Vec<VectorMatch>, MemoryError> {
        let mut owned = Vec::new();
        let mut token = None;
        let mut pages = 0usize;
        loop {
            let page = self
                .store
                .list(&self.settings.index, token, SCAN_PAGE_SIZE)
                .await?;
            pages += 1;
            owned.extend(retain_owned(page.vectors, owner));
            match page.next_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }
        debug!(
            "memory scan (owner={}, pages={}, owned={})",
            owner,
            pages,
            owned.len()
        );
        Ok(owned)
    }
}

fn retain_owned(matches: Vec<VectorMatch>, owner: &Owner) -> Vec<VectorMatch> {
    let total = matches.len();
    let owned: Vec<VectorMatch> = matches
        .into_iter()
        .filter(|found| owner.matches(&found.metadata))
        .collect();
    if owned.len() != total {
        warn!(
            "dropped records failing the owner check (owner={}, dropped={})",
            owner,
            total - owned.len()
        );
    }
    owned
}

/// `1 - distance`; a missing distance counts as 1.0.
fn similarity(found: &VectorMatch) -> f64 {
    1.0 - f64::from(found.distance.unwrap_or(1.0))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Rejects a similarity threshold outside `[0, 1]`.
pub fn check_min_score(min_score: f32) -> Result<(), MemoryError> {
    if (0.0..=1.0).contains(&min_score) {
        Ok(())
    } else {
        Err(MemoryError::Validation(
            "min_score must be between 0 and 1".to_string(),
        ))
    }
}

fn context_threshold(min_score: f32) -> f32 {
    (min_score - CONTEXT_RELAXATION).max(CONTEXT_MIN_THRESHOLD)
}

/// Unparseable timestamps sort after parseable ones, by raw text.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

fn memory_key(style: KeyStyle, owner: &Owner, now: DateTime<Utc>) -> String {
    match style {
        KeyStyle::Uuid => Uuid::new_v4().to_string(),
        KeyStyle::Prefixed => {
            let suffix = Uuid::new_v4().simple().to_string();
            format!(
                "{}_{}_{}",
                owner.id(),
                now.format("%Y%m%d_%H%M%S"),
                &suffix[..8]
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{context_threshold, memory_key, parse_timestamp, round3, similarity};
    use crate::model::Owner;
    use crate::vector::VectorMatch;
    use cairn_rs_config::KeyStyle;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn prefixed_key_has_owner_time_and_suffix() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 5).unwrap();
        let key = memory_key(KeyStyle::Prefixed, &Owner::User("user123".to_string()), now);
        let parts: Vec<&str> = key.split('_').collect();
        assert_eq!(parts[0], "user123");
        assert_eq!(parts[1], "20240501");
        assert_eq!(parts[2], "103005");
        assert_eq!(parts[3].len(), 8);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn keys_do_not_collide_within_a_second() {
        let now = Utc::now();
        let owner = Owner::User("u1".to_string());
        let first = memory_key(KeyStyle::Prefixed, &owner, now);
        let second = memory_key(KeyStyle::Prefixed, &owner, now);
        assert_ne!(first, second);
        let uuid = memory_key(KeyStyle::Uuid, &owner, now);
        assert_eq!(uuid.len(), 36);
    }

    #[test]
    fn missing_distance_means_zero_similarity() {
        let found = VectorMatch {
            key: "k".to_string(),
            distance: None,
            metadata: Value::Null,
        };
        assert_eq!(similarity(&found), 0.0);
        let found = VectorMatch {
            distance: Some(0.25),
            ..found
        };
        assert_eq!(similarity(&found), 0.75);
    }

    #[test]
    fn context_threshold_is_relaxed_with_floor() {
        assert!((context_threshold(0.7) - 0.5).abs() < 1e-6);
        assert_eq!(context_threshold(0.2), 0.1);
        assert_eq!(context_threshold(0.0), 0.1);
    }

    #[test]
    fn rounding_and_timestamp_parsing() {
        assert_eq!(round3(0.87654), 0.877);
        assert!(parse_timestamp("2024-05-01T10:00:00+00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
