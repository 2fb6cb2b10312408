//! Vector memory tool with per-user isolation.

use crate::builtins::utils::{parse_args, to_payload, with_field};
use crate::services::memory_service;
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use cairn_rs_memory::{MemoryOverrides, Owner, check_min_score};
use cairn_rs_protocol::ToolError;
use log::info;
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Metadata key carrying the record key for deletes.
const VECTOR_KEY: &str = "vector_key";

/// Store, search, list and delete memories in a vector index.
#[derive(Debug, Default)]
pub struct S3VectorMemoryTool;

/// Memory tool action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryAction {
    Store,
    Retrieve,
    List,
    Delete,
    AutoStoreAndRetrieve,
    AutoContext,
}

/// An action with the inputs it needs, checked before any remote call.
#[derive(Debug, PartialEq)]
enum MemoryCommand<'a> {
    Store { content: &'a str },
    Retrieve { query: &'a str },
    List,
    Delete { key: String },
    AutoStoreAndRetrieve,
    AutoContext,
}

impl MemoryAction {
    fn parse(raw: &str) -> Result<Self, ToolError> {
        let action = match raw.trim() {
            "store" => MemoryAction::Store,
            "retrieve" => MemoryAction::Retrieve,
            "list" => MemoryAction::List,
            "delete" => MemoryAction::Delete,
            "auto_store_and_retrieve" => MemoryAction::AutoStoreAndRetrieve,
            "auto_context" => MemoryAction::AutoContext,
            other => return Err(ToolError::Validation(format!("Invalid action: {other}"))),
        };
        Ok(action)
    }

    fn as_str(self) -> &'static str {
        match self {
            MemoryAction::Store => "store",
            MemoryAction::Retrieve => "retrieve",
            MemoryAction::List => "list",
            MemoryAction::Delete => "delete",
            MemoryAction::AutoStoreAndRetrieve => "auto_store_and_retrieve",
            MemoryAction::AutoContext => "auto_context",
        }
    }
}

#[async_trait]
impl Tool for S3VectorMemoryTool {
    fn name(&self) -> &str {
        "s3_vector_memory"
    }

    fn description(&self) -> &str {
        "Store, retrieve, list and delete user-isolated memories in an S3 vector index"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["store", "retrieve", "list", "delete", "auto_store_and_retrieve", "auto_context"],
                    "description": "Operation to perform.",
                },
                "content": { "type": "string", "description": "Memory text to store." },
                "query": { "type": "string", "description": "Search query for retrieval." },
                "user_id": { "type": "string", "description": "Owner of the memories." },
                "agent_id": { "type": "string", "description": "Agent owner, used when user_id is absent." },
                "memory_key": { "type": "string", "description": "Key of the memory to delete." },
                "metadata": { "type": "object", "description": "Extra metadata to store; `vector_key` names the memory to delete." },
                "vector_bucket_name": { "type": "string" },
                "index_name": { "type": "string" },
                "region_name": { "type": "string" },
                "embedding_model": { "type": "string" },
                "top_k": { "type": "integer", "minimum": 1 },
                "min_score": { "type": "number", "minimum": 0, "maximum": 1 },
                "max_context_memories": { "type": "integer", "minimum": 1 },
                "auto_inject_context": { "type": "boolean" },
            },
            "required": ["action"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: MemoryArgs = parse_args(args)?;
        let owner = Owner::from_ids(input.user_id.as_deref(), input.agent_id.as_deref())?;
        let action = MemoryAction::parse(&input.action)?;

        let config = &ctx.config().memory;
        let top_k = input.top_k.unwrap_or(config.top_k);
        let min_score = input.min_score.unwrap_or(config.min_score);
        let max_context = input
            .max_context_memories
            .unwrap_or(config.max_context_memories);
        let inject_context = input
            .auto_inject_context
            .unwrap_or(config.auto_inject_context);
        check_min_score(min_score)?;
        let command = input.command(action)?;
        check_limits(&command, input.query.as_deref(), top_k, max_context, inject_context)?;

        info!(
            "memory tool call (action={}, owner={}, top_k={})",
            action.as_str(),
            owner,
            top_k
        );
        let service = memory_service(&ctx.services, &input.overrides());
        service.ensure_ready().await?;

        let payload = match command {
            MemoryCommand::Store { content } => {
                to_payload(&service.store(content, &owner, input.extra_metadata()).await?)?
            }
            MemoryCommand::Retrieve { query } => {
                let outcome = service.retrieve(query, &owner, top_k, min_score).await?;
                let payload = to_payload(&outcome)?;
                if inject_context {
                    let context = service
                        .auto_context(&owner, Some(query), max_context, min_score)
                        .await?;
                    with_field(payload, "context_summary", Value::String(context.summary))
                } else {
                    payload
                }
            }
            MemoryCommand::List => to_payload(&service.list(&owner, top_k).await?)?,
            MemoryCommand::Delete { key } => {
                to_payload(&service.delete(&key, Some(&owner)).await?)?
            }
            MemoryCommand::AutoStoreAndRetrieve => to_payload(
                &service
                    .auto_store_and_retrieve(
                        &owner,
                        input.content.as_deref(),
                        input.query.as_deref(),
                        top_k,
                        min_score,
                        input.extra_metadata(),
                    )
                    .await?,
            )?,
            MemoryCommand::AutoContext => {
                let current = input.query.as_deref().or(input.content.as_deref());
                to_payload(
                    &service
                        .auto_context(&owner, current, max_context, min_score)
                        .await?,
                )?
            }
        };
        Ok(with_field(payload, "action", json!(action.as_str())))
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ToolError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ToolError::Validation(format!("{field} is required")))
}

/// Result-size limits the command will use must be positive.
fn check_limits(
    command: &MemoryCommand<'_>,
    query: Option<&str>,
    top_k: usize,
    max_context: usize,
    inject_context: bool,
) -> Result<(), ToolError> {
    let has_query = query.is_some_and(|query| !query.trim().is_empty());
    let uses_top_k = match command {
        MemoryCommand::Retrieve { .. } | MemoryCommand::List => true,
        MemoryCommand::AutoStoreAndRetrieve => has_query,
        _ => false,
    };
    if uses_top_k && top_k == 0 {
        return Err(ToolError::Validation(
            "top_k must be greater than 0".to_string(),
        ));
    }
    let uses_context = match command {
        MemoryCommand::Retrieve { .. } => inject_context,
        MemoryCommand::AutoContext => true,
        _ => false,
    };
    if uses_context && max_context == 0 {
        return Err(ToolError::Validation(
            "max_context_memories must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Arguments for S3VectorMemoryTool.
#[derive(Debug, Deserialize)]
struct MemoryArgs {
    action: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    agent_id: Option<String>,
    #[serde(default)]
    memory_key: Option<String>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
    #[serde(default)]
    vector_bucket_name: Option<String>,
    #[serde(default)]
    index_name: Option<String>,
    #[serde(default)]
    region_name: Option<String>,
    #[serde(default)]
    embedding_model: Option<String>,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    min_score: Option<f32>,
    #[serde(default)]
    max_context_memories: Option<usize>,
    #[serde(default)]
    auto_inject_context: Option<bool>,
}

impl MemoryArgs {
    fn overrides(&self) -> MemoryOverrides {
        MemoryOverrides {
            vector_bucket_name: self.vector_bucket_name.clone(),
            index_name: self.index_name.clone(),
            region_name: self.region_name.clone(),
            embedding_model: self.embedding_model.clone(),
        }
    }

    fn command(&self, action: MemoryAction) -> Result<MemoryCommand<'_>, ToolError> {
        let command = match action {
            MemoryAction::Store => MemoryCommand::Store {
                content: required(self.content.as_deref(), "content")?,
            },
            MemoryAction::Retrieve => MemoryCommand::Retrieve {
                query: required(self.query.as_deref(), "query")?,
            },
            MemoryAction::List => MemoryCommand::List,
            MemoryAction::Delete => MemoryCommand::Delete {
                key: self.delete_key().ok_or_else(|| {
                    ToolError::Validation("memory_key is required for delete action".to_string())
                })?,
            },
            MemoryAction::AutoStoreAndRetrieve => MemoryCommand::AutoStoreAndRetrieve,
            MemoryAction::AutoContext => MemoryCommand::AutoContext,
        };
        Ok(command)
    }

    /// `memory_key`, else `metadata.vector_key`.
    fn delete_key(&self) -> Option<String> {
        self.memory_key
            .clone()
            .or_else(|| {
                self.metadata
                    .as_ref()
                    .and_then(|metadata| metadata.get(VECTOR_KEY))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|key| !key.trim().is_empty())
    }

    /// Caller metadata to store, without the delete selector.
    fn extra_metadata(&self) -> Option<Map<String, Value>> {
        let mut metadata = self.metadata.clone()?;
        metadata.remove(VECTOR_KEY);
        Some(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryAction, MemoryArgs, MemoryCommand, check_limits};
    use crate::builtins::utils::parse_args;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unknown_action_is_named_in_error() {
        let err = MemoryAction::parse("forget").unwrap_err();
        assert_eq!(err.to_string(), "Invalid action: forget");
        assert_eq!(
            MemoryAction::parse("auto_context").expect("action"),
            MemoryAction::AutoContext
        );
    }

    #[test]
    fn delete_key_falls_back_to_metadata() {
        let args: MemoryArgs = parse_args(json!({
            "action": "delete",
            "user_id": "u1",
            "metadata": { "vector_key": "k-from-metadata" },
        }))
        .expect("args");
        assert_eq!(args.delete_key().as_deref(), Some("k-from-metadata"));
        assert_eq!(args.extra_metadata().expect("metadata").len(), 0);

        let args: MemoryArgs = parse_args(json!({
            "action": "delete",
            "memory_key": "k-explicit",
            "metadata": { "vector_key": "k-from-metadata" },
        }))
        .expect("args");
        assert_eq!(args.delete_key().as_deref(), Some("k-explicit"));
    }

    #[test]
    fn commands_require_their_inputs() {
        let args: MemoryArgs = parse_args(json!({ "action": "store", "user_id": "u1" }))
            .expect("args");
        let err = args.command(MemoryAction::Store).unwrap_err();
        assert_eq!(err.to_string(), "content is required");
        assert_eq!(
            args.command(MemoryAction::Retrieve).unwrap_err().to_string(),
            "query is required"
        );
        assert_eq!(
            args.command(MemoryAction::Delete).unwrap_err().to_string(),
            "memory_key is required for delete action"
        );
        assert_eq!(args.command(MemoryAction::List).expect("list"), MemoryCommand::List);
    }

    #[test]
    fn limits_apply_only_where_used() {
        let retrieve = MemoryCommand::Retrieve { query: "food" };
        assert!(check_limits(&retrieve, Some("food"), 0, 3, true).is_err());
        assert!(check_limits(&retrieve, Some("food"), 5, 0, true).is_err());
        assert!(check_limits(&retrieve, Some("food"), 5, 0, false).is_ok());
        assert!(check_limits(&MemoryCommand::AutoStoreAndRetrieve, None, 0, 3, true).is_ok());
        assert!(check_limits(&MemoryCommand::AutoContext, None, 5, 0, true).is_err());
    }

    #[test]
    fn overrides_carry_explicit_arguments() {
        let args: MemoryArgs = parse_args(json!({
            "action": "list",
            "vector_bucket_name": "bucket",
            "region_name": "eu-west-1",
        }))
        .expect("args");
        let overrides = args.overrides();
        assert_eq!(overrides.vector_bucket_name.as_deref(), Some("bucket"));
        assert_eq!(overrides.region_name.as_deref(), Some("eu-west-1"));
        assert_eq!(overrides.index_name, None);
    }
}
