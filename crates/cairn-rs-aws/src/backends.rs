use crate::bedrock::{BedrockConverse, BedrockInvoker};
use crate::s3::S3ObjectFetcher;
use crate::s3vectors::S3VectorStore;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use cairn_rs_media::{ConverseBackend, ObjectFetcher};
use cairn_rs_memory::{ModelInvoker, VectorStore};
use cairn_rs_tools::BackendProvider;
use log::debug;
use std::sync::Arc;

/// Builds AWS clients for the requested region from one loaded SDK config.
///
/// Credentials and retry settings come from the default provider chain;
/// only the region differs between clients.
#[derive(Clone)]
pub struct AwsBackends {
    sdk: SdkConfig,
}

impl AwsBackends {
    /// Load the default SDK config from the environment.
    pub async fn load() -> Self {
        Self::from_sdk_config(aws_config::load_defaults(BehaviorVersion::latest()).await)
    }

    pub fn from_sdk_config(sdk: SdkConfig) -> Self {
        Self { sdk }
    }

    fn bedrock(&self, region: &str) -> aws_sdk_bedrockruntime::Client {
        debug!("building bedrock runtime client (region={})", region);
        let config = aws_sdk_bedrockruntime::config::Builder::from(&self.sdk)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_bedrockruntime::Client::from_conf(config)
    }
}

impl BackendProvider for AwsBackends {
    fn model_invoker(&self, region: &str) -> Arc<dyn ModelInvoker> {
        Arc::new(BedrockInvoker::new(self.bedrock(region)))
    }

    fn vector_store(&self, region: &str) -> Arc<dyn VectorStore> {
        debug!("building s3 vectors client (region={})", region);
        let config = aws_sdk_s3vectors::config::Builder::from(&self.sdk)
            .region(Region::new(region.to_string()))
            .build();
        Arc::new(S3VectorStore::new(aws_sdk_s3vectors::Client::from_conf(
            config,
        )))
    }

    fn converse(&self, region: &str) -> Arc<dyn ConverseBackend> {
        Arc::new(BedrockConverse::new(self.bedrock(region)))
    }

    fn objects(&self, region: &str) -> Arc<dyn ObjectFetcher> {
        debug!("building s3 client (region={})", region);
        let config = aws_sdk_s3::config::Builder::from(&self.sdk)
            .region(Region::new(region.to_string()))
            .build();
        Arc::new(S3ObjectFetcher::new(aws_sdk_s3::Client::from_conf(config)))
    }
}
