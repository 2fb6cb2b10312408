//! Utility helpers shared by built-in tools.

use cairn_rs_protocol::ToolError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse JSON args into a typed struct for tool calls.
pub(super) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::Validation(err.to_string()))
}

/// Serialize a tool result payload.
pub(super) fn to_payload<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|err| ToolError::Validation(format!("failed to encode result: {err}")))
}

/// Insert a field into an object payload; other payloads are left alone.
pub(super) fn with_field(mut payload: Value, key: &str, value: Value) -> Value {
    if let Value::Object(fields) = &mut payload {
        fields.insert(key.to_string(), value);
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::{parse_args, with_field};
    use cairn_rs_protocol::ToolError;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Args {
        action: String,
        #[serde(default)]
        top_k: Option<usize>,
    }

    #[test]
    fn parse_args_reads_struct_fields() {
        let args: Args = parse_args(json!({ "action": "list", "top_k": 3 })).expect("args");
        assert_eq!(args.action, "list");
        assert_eq!(args.top_k, Some(3));
    }

    #[test]
    fn parse_args_reports_bad_types() {
        let err = parse_args::<Args>(json!({ "action": "list", "top_k": "three" })).unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[test]
    fn with_field_adds_to_objects_only() {
        assert_eq!(
            with_field(json!({ "a": 1 }), "action", json!("store")),
            json!({ "a": 1, "action": "store" })
        );
        assert_eq!(with_field(json!("x"), "action", json!("store")), json!("x"));
    }
}
