//! `{status, ...payload}` response envelope shared by every operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Outcome marker carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Wrap a payload in a success envelope.
///
/// Object payloads are flattened next to `status`; any other value is placed
/// under `result`. A `status` key inside the payload is overwritten.
pub fn success_envelope(payload: Value) -> Value {
    let mut envelope = Map::new();
    envelope.insert("status".to_string(), json!(ResponseStatus::Success));
    match payload {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key != "status" {
                    envelope.insert(key, value);
                }
            }
        }
        Value::Null => {}
        other => {
            envelope.insert("result".to_string(), other);
        }
    }
    Value::Object(envelope)
}

/// Build an error envelope with a human-readable message.
pub fn error_envelope(message: impl Into<String>) -> Value {
    json!({
        "status": ResponseStatus::Error,
        "message": message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::{error_envelope, success_envelope};
    use crate::{RemoteError, RemoteService, ToolError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn success_flattens_object_payload() {
        let envelope = success_envelope(json!({ "memory_key": "k1", "status": "ignored" }));
        assert_eq!(envelope, json!({ "status": "success", "memory_key": "k1" }));
    }

    #[test]
    fn success_nests_scalar_payload() {
        let envelope = success_envelope(json!("done"));
        assert_eq!(envelope, json!({ "status": "success", "result": "done" }));
    }

    #[test]
    fn error_envelope_carries_message() {
        assert_eq!(
            error_envelope("user_id is required"),
            json!({ "status": "error", "message": "user_id is required" })
        );
    }

    #[test]
    fn remote_errors_keep_upstream_message() {
        let err = ToolError::from(RemoteError::new(
            RemoteService::VectorStore,
            "AccessDeniedException: not authorized",
        ));
        assert_eq!(
            err.to_envelope(),
            json!({
                "status": "error",
                "message": "vector store service error: AccessDeniedException: not authorized",
            })
        );
    }
}
