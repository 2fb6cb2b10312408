use async_trait::async_trait;
use cairn_rs_media::{ConverseBackend, ConverseRequest, ObjectFetcher};
use cairn_rs_protocol::{RemoteError, RemoteService};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Converse backend returning a fixed reply and recording requests.
pub struct StubConverse {
    reply: String,
    requests: Mutex<Vec<ConverseRequest>>,
}

impl StubConverse {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ConverseRequest> {
        self.requests.lock().clone()
    }
}

impl Default for StubConverse {
    fn default() -> Self {
        Self::new("A short clip of a dog running on a beach.")
    }
}

#[async_trait]
impl ConverseBackend for StubConverse {
    async fn converse(&self, request: ConverseRequest) -> Result<String, RemoteError> {
        self.requests.lock().push(request);
        Ok(self.reply.clone())
    }
}

/// Object store backed by a map of `(bucket, key)` to bytes.
#[derive(Default)]
pub struct StubObjects {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    reported_sizes: Mutex<HashMap<(String, String), u64>>,
    fetched: Mutex<Vec<(String, String)>>,
}

impl StubObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, bytes: Vec<u8>) {
        self.objects
            .lock()
            .insert((bucket.to_string(), key.to_string()), bytes);
    }

    /// Size reported for an object instead of its byte length.
    pub fn report_size(&self, bucket: &str, key: &str, size: u64) {
        self.reported_sizes
            .lock()
            .insert((bucket.to_string(), key.to_string()), size);
    }

    /// `(bucket, key)` of every fetch so far.
    pub fn fetched(&self) -> Vec<(String, String)> {
        self.fetched.lock().clone()
    }
}

#[async_trait]
impl ObjectFetcher for StubObjects {
    async fn size(&self, bucket: &str, key: &str) -> Result<u64, RemoteError> {
        let id = (bucket.to_string(), key.to_string());
        if let Some(size) = self.reported_sizes.lock().get(&id) {
            return Ok(*size);
        }
        self.objects
            .lock()
            .get(&id)
            .map(|bytes| bytes.len() as u64)
            .ok_or_else(|| no_such_key(bucket, key))
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RemoteError> {
        self.fetched
            .lock()
            .push((bucket.to_string(), key.to_string()));
        self.objects
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| no_such_key(bucket, key))
    }
}

fn no_such_key(bucket: &str, key: &str) -> RemoteError {
    RemoteError::new(
        RemoteService::ObjectStore,
        format!("NoSuchKey: s3://{bucket}/{key}"),
    )
}
