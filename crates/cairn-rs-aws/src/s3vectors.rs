//! S3 Vectors implementation of [`VectorStore`].

use crate::document::{from_document, to_document};
use crate::error::remote;
use async_trait::async_trait;
use aws_sdk_s3vectors::Client;
use aws_sdk_s3vectors::error::ProvideErrorMetadata;
use aws_sdk_s3vectors::types::{
    DataType, DistanceMetric, MetadataConfiguration, PutInputVector, VectorData,
};
use aws_smithy_types::Document;
use cairn_rs_memory::{
    EnsureOutcome, IndexSpec, VectorIndex, VectorMatch, VectorPage, VectorQuery, VectorRecord,
    VectorStore,
};
use cairn_rs_protocol::{RemoteError, RemoteService};
use log::{debug, info};
use serde_json::Value;

const NOT_FOUND: &str = "NotFoundException";
const CONFLICT: &str = "ConflictException";

/// Vector store backed by an S3 vector bucket.
#[derive(Clone)]
pub struct S3VectorStore {
    client: Client,
}

impl S3VectorStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), RemoteError> {
        let err = match self
            .client
            .get_vector_bucket()
            .vector_bucket_name(bucket)
            .send()
            .await
        {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };
        if err.code() != Some(NOT_FOUND) {
            return Err(store_error(err));
        }
        info!("creating vector bucket (bucket={})", bucket);
        match self
            .client
            .create_vector_bucket()
            .vector_bucket_name(bucket)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some(CONFLICT) => Ok(()),
            Err(err) => Err(store_error(err)),
        }
    }
}

fn store_error<E: std::error::Error>(err: E) -> RemoteError {
    remote(RemoteService::VectorStore, err)
}

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn metadata_value(metadata: Option<&Document>) -> Value {
    metadata.map(from_document).unwrap_or(Value::Null)
}

#[async_trait]
impl VectorStore for S3VectorStore {
    async fn ensure_index(
        &self,
        index: &VectorIndex,
        spec: &IndexSpec,
    ) -> Result<EnsureOutcome, RemoteError> {
        self.ensure_bucket(&index.bucket).await?;
        let err = match self
            .client
            .get_index()
            .vector_bucket_name(&index.bucket)
            .index_name(&index.index)
            .send()
            .await
        {
            Ok(_) => {
                debug!("vector index present (index={})", index);
                return Ok(EnsureOutcome::AlreadyExisted);
            }
            Err(err) => err,
        };
        if err.code() != Some(NOT_FOUND) {
            return Err(store_error(err));
        }

        info!(
            "creating vector index (index={}, dimension={}, metric={})",
            index,
            spec.dimension,
            spec.metric.as_str()
        );
        let metadata = MetadataConfiguration::builder()
            .set_non_filterable_metadata_keys(Some(spec.non_filterable_keys.clone()))
            .build()
            .map_err(store_error)?;
        match self
            .client
            .create_index()
            .vector_bucket_name(&index.bucket)
            .index_name(&index.index)
            .data_type(DataType::Float32)
            .dimension(clamp_i32(spec.dimension))
            .distance_metric(DistanceMetric::from(spec.metric.as_str()))
            .metadata_configuration(metadata)
            .send()
            .await
        {
            Ok(_) => Ok(EnsureOutcome::Created),
            Err(err) if err.code() == Some(CONFLICT) => Ok(EnsureOutcome::AlreadyExisted),
            Err(err) => Err(store_error(err)),
        }
    }

    async fn put(&self, index: &VectorIndex, records: Vec<VectorRecord>) -> Result<(), RemoteError> {
        let count = records.len();
        let vectors = records
            .into_iter()
            .map(|record| {
                PutInputVector::builder()
                    .key(record.key)
                    .data(VectorData::Float32(record.vector))
                    .metadata(to_document(&record.metadata))
                    .build()
                    .map_err(store_error)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.client
            .put_vectors()
            .vector_bucket_name(&index.bucket)
            .index_name(&index.index)
            .set_vectors(Some(vectors))
            .send()
            .await
            .map_err(store_error)?;
        debug!("put vectors (index={}, count={})", index, count);
        Ok(())
    }

    async fn query(
        &self,
        index: &VectorIndex,
        query: VectorQuery,
    ) -> Result<Vec<VectorMatch>, RemoteError> {
        let output = self
            .client
            .query_vectors()
            .vector_bucket_name(&index.bucket)
            .index_name(&index.index)
            .top_k(clamp_i32(query.top_k))
            .query_vector(VectorData::Float32(query.vector))
            .set_filter(query.filter.as_ref().map(to_document))
            .return_metadata(query.return_metadata)
            .return_distance(query.return_distance)
            .send()
            .await
            .map_err(store_error)?;
        Ok(output
            .vectors()
            .iter()
            .map(|found| VectorMatch {
                key: found.key().to_string(),
                distance: found.distance(),
                metadata: metadata_value(found.metadata()),
            })
            .collect())
    }

    async fn get(
        &self,
        index: &VectorIndex,
        keys: &[String],
    ) -> Result<Vec<VectorMatch>, RemoteError> {
        let output = self
            .client
            .get_vectors()
            .vector_bucket_name(&index.bucket)
            .index_name(&index.index)
            .set_keys(Some(keys.to_vec()))
            .return_data(false)
            .return_metadata(true)
            .send()
            .await
            .map_err(store_error)?;
        Ok(output
            .vectors()
            .iter()
            .map(|found| VectorMatch {
                key: found.key().to_string(),
                distance: None,
                metadata: metadata_value(found.metadata()),
            })
            .collect())
    }

    async fn delete(&self, index: &VectorIndex, keys: &[String]) -> Result<(), RemoteError> {
        self.client
            .delete_vectors()
            .vector_bucket_name(&index.bucket)
            .index_name(&index.index)
            .set_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn list(
        &self,
        index: &VectorIndex,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<VectorPage, RemoteError> {
        let output = self
            .client
            .list_vectors()
            .vector_bucket_name(&index.bucket)
            .index_name(&index.index)
            .set_next_token(page_token)
            .max_results(clamp_i32(page_size))
            .return_data(false)
            .return_metadata(true)
            .send()
            .await
            .map_err(store_error)?;
        Ok(VectorPage {
            vectors: output
                .vectors()
                .iter()
                .map(|found| VectorMatch {
                    key: found.key().to_string(),
                    distance: None,
                    metadata: metadata_value(found.metadata()),
                })
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }
}
