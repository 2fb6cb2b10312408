//! Memory record and result models.

use crate::classify::Classification;
use crate::error::MemoryError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key holding the original memory text.
pub const CONTENT_KEY: &str = "content";
/// Metadata key holding the creation time.
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Metadata key holding the serialized classification.
pub const CLASSIFICATION_KEY: &str = "classification";
/// Metadata key for user-owned records.
pub const USER_ID_KEY: &str = "user_id";
/// Metadata key for agent-owned records.
pub const AGENT_ID_KEY: &str = "agent_id";

/// Metadata keys that are stored but cannot be used in query filters.
pub const NON_FILTERABLE_KEYS: [&str; 3] = [CONTENT_KEY, TIMESTAMP_KEY, CLASSIFICATION_KEY];

/// Keys callers cannot set through extra metadata.
const RESERVED_KEYS: [&str; 5] = [
    USER_ID_KEY,
    AGENT_ID_KEY,
    CONTENT_KEY,
    TIMESTAMP_KEY,
    CLASSIFICATION_KEY,
];

/// Isolation key of a memory record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    User(String),
    Agent(String),
}

impl Owner {
    /// Build an owner from optional ids. A non-blank `user_id` wins.
    pub fn from_ids(user_id: Option<&str>, agent_id: Option<&str>) -> Result<Self, MemoryError> {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        if let Some(user) = clean(user_id) {
            return Ok(Owner::User(user));
        }
        if let Some(agent) = clean(agent_id) {
            return Ok(Owner::Agent(agent));
        }
        Err(MemoryError::Validation("user_id is required".to_string()))
    }

    /// Metadata field the owner is stored under.
    pub fn field(&self) -> &'static str {
        match self {
            Owner::User(_) => USER_ID_KEY,
            Owner::Agent(_) => AGENT_ID_KEY,
        }
    }

    /// Owner identifier.
    pub fn id(&self) -> &str {
        match self {
            Owner::User(id) | Owner::Agent(id) => id,
        }
    }

    /// Whether stored metadata belongs to this owner.
    pub fn matches(&self, metadata: &Value) -> bool {
        metadata
            .get(self.field())
            .and_then(Value::as_str)
            .is_some_and(|stored| stored == self.id())
    }

    /// Equality filter on the owner field.
    pub fn filter(&self) -> Value {
        let mut filter = Map::new();
        filter.insert(self.field().to_string(), Value::String(self.id().to_string()));
        Value::Object(filter)
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::User(id) => write!(f, "user {id}"),
            Owner::Agent(id) => write!(f, "agent {id}"),
        }
    }
}

/// A memory about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub key: String,
    pub owner: Owner,
    pub content: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
    pub classification: Option<Classification>,
    /// Caller-supplied metadata; reserved keys are dropped.
    pub extra: Map<String, Value>,
}

impl MemoryRecord {
    /// Metadata document stored next to the embedding.
    pub fn metadata(&self) -> Result<Value, MemoryError> {
        let mut metadata = Map::new();
        for (key, value) in &self.extra {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            metadata.insert(key.clone(), value.clone());
        }
        metadata.insert(
            self.owner.field().to_string(),
            Value::String(self.owner.id().to_string()),
        );
        metadata.insert(CONTENT_KEY.to_string(), Value::String(self.content.clone()));
        metadata.insert(
            TIMESTAMP_KEY.to_string(),
            Value::String(self.timestamp.clone()),
        );
        if let Some(classification) = &self.classification {
            metadata.insert(
                CLASSIFICATION_KEY.to_string(),
                Value::String(serde_json::to_string(classification)?),
            );
        }
        Ok(Value::Object(metadata))
    }
}

/// Read a string field from stored metadata, empty when absent.
pub(crate) fn metadata_str(metadata: &Value, key: &str) -> String {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Decode a stored classification, tolerating records written without one.
pub(crate) fn metadata_classification(metadata: &Value) -> Option<Classification> {
    match metadata.get(CLASSIFICATION_KEY)? {
        Value::String(raw) => serde_json::from_str(raw).ok(),
        value @ Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

/// A retrieved memory with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryHit {
    pub id: String,
    pub memory: String,
    /// Rounded to three decimals.
    pub similarity: f64,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

/// A memory returned by listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListedMemory {
    pub id: String,
    pub memory: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

/// A memory selected as conversation context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextMemory {
    pub content: String,
    pub similarity: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreOutcome {
    pub memory_key: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieveOutcome {
    pub memories: Vec<MemoryHit>,
    /// Matches above the threshold before truncation.
    pub total_found: usize,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListOutcome {
    pub memories: Vec<ListedMemory>,
    pub total_found: usize,
    /// True when the listing came from a similarity query and may be incomplete.
    pub approximate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteOutcome {
    pub memory_key: String,
    pub message: String,
    /// `None` when existence was not checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextOutcome {
    pub context_memories: Vec<ContextMemory>,
    pub summary: String,
    pub total_context: usize,
}

/// Result of a combined retrieve-then-store call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored: Option<StoreOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved: Option<RetrieveOutcome>,
    pub context_memories: Vec<MemoryHit>,
}
