//! Lambda entry point.

use cairn_rs_aws::AwsBackends;
use cairn_rs_config::CairnConfig;
use cairn_rs_lambda::{EventHandler, caller_defaults};
use cairn_rs_tools::{ToolContext, ToolServices, builtin_tool_registry};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use log::info;
use serde_json::Value;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let config = CairnConfig::load(None)?;
    info!(
        "starting lambda handler (media_region_set={}, media_model_set={})",
        config.media.region.is_some(),
        config.media.model_id.is_some()
    );
    let services = Arc::new(ToolServices {
        config,
        backends: Arc::new(AwsBackends::load().await),
        caller_defaults: caller_defaults(),
    });
    let handler = Arc::new(EventHandler::new(
        builtin_tool_registry(),
        ToolContext::new(services),
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move {
            let LambdaEvent { payload, context } = event;
            let response = handler
                .handle(payload, Some(context.request_id.as_str()))
                .await;
            Ok::<Value, Error>(response)
        }
    }))
    .await
}
