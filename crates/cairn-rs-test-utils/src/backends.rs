use crate::media::{StubConverse, StubObjects};
use crate::model::StubModelInvoker;
use crate::vector::InMemoryVectorStore;
use cairn_rs_media::{ConverseBackend, ObjectFetcher};
use cairn_rs_memory::{ModelInvoker, VectorStore};
use cairn_rs_tools::BackendProvider;
use parking_lot::Mutex;
use std::sync::Arc;

/// Backend provider handing out shared stubs for every region.
#[derive(Default)]
pub struct StubBackends {
    pub invoker: Arc<StubModelInvoker>,
    pub store: Arc<InMemoryVectorStore>,
    pub converse: Arc<StubConverse>,
    pub objects: Arc<StubObjects>,
    regions: Mutex<Vec<String>>,
}

impl StubBackends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoker(mut self, invoker: StubModelInvoker) -> Self {
        self.invoker = Arc::new(invoker);
        self
    }

    pub fn with_converse(mut self, converse: StubConverse) -> Self {
        self.converse = Arc::new(converse);
        self
    }

    /// Regions requested so far, in order.
    pub fn regions(&self) -> Vec<String> {
        self.regions.lock().clone()
    }

    fn record(&self, region: &str) {
        self.regions.lock().push(region.to_string());
    }
}

impl BackendProvider for StubBackends {
    fn model_invoker(&self, region: &str) -> Arc<dyn ModelInvoker> {
        self.record(region);
        self.invoker.clone()
    }

    fn vector_store(&self, region: &str) -> Arc<dyn VectorStore> {
        self.record(region);
        self.store.clone()
    }

    fn converse(&self, region: &str) -> Arc<dyn ConverseBackend> {
        self.record(region);
        self.converse.clone()
    }

    fn objects(&self, region: &str) -> Arc<dyn ObjectFetcher> {
        self.record(region);
        self.objects.clone()
    }
}
