//! Remote model invocation seam.

use async_trait::async_trait;
use cairn_rs_protocol::RemoteError;
use serde_json::Value;

/// Invokes a hosted model with a JSON request body and returns its JSON reply.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Send `body` to `model_id`.
    async fn invoke(&self, model_id: &str, body: &Value) -> Result<Value, RemoteError>;
}
