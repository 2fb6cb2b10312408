use crate::error::remote;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use cairn_rs_media::ObjectFetcher;
use cairn_rs_protocol::{RemoteError, RemoteService};
use log::debug;

/// Object size lookups and whole-object reads from S3.
#[derive(Clone)]
pub struct S3ObjectFetcher {
    client: Client,
}

impl S3ObjectFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectFetcher for S3ObjectFetcher {
    async fn size(&self, bucket: &str, key: &str) -> Result<u64, RemoteError> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote(RemoteService::ObjectStore, err))?;
        Ok(output.content_length().map_or(0, |length| length.max(0) as u64))
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote(RemoteService::ObjectStore, err))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| remote(RemoteService::ObjectStore, err))?
            .into_bytes();
        debug!(
            "fetched object (bucket={}, key_len={}, bytes={})",
            bucket,
            key.len(),
            bytes.len()
        );
        Ok(bytes.to_vec())
    }
}
