//! Per-call construction of memory and media services.

use crate::context::ToolServices;
use cairn_rs_media::MediaAnalyzer;
use cairn_rs_memory::{
    MemoryOverrides, MemoryService, MemoryTarget, ModelClassifier, ModelEmbedder,
};
use log::debug;
use std::sync::Arc;

/// Memory service for the resolved bucket, index, region and model.
pub fn memory_service(services: &ToolServices, overrides: &MemoryOverrides) -> MemoryService {
    let target = MemoryTarget::resolve(&services.config.memory, overrides);
    debug!(
        "building memory service (index={}, region={}, embedding_model={}, classify={})",
        target.settings.index,
        target.region,
        target.embedding_model,
        target.classification_model.is_some()
    );
    let invoker = services.backends.model_invoker(&target.region);
    let embedder = ModelEmbedder::new(
        invoker.clone(),
        target.embedding_model,
        target.settings.dimension,
    );
    let service = MemoryService::new(
        Arc::new(embedder),
        services.backends.vector_store(&target.region),
        target.settings,
    );
    match target.classification_model {
        Some(model_id) => service.with_classifier(Arc::new(ModelClassifier::new(invoker, model_id))),
        None => service,
    }
}

/// Media analyzer bound to one region.
pub fn media_analyzer(services: &ToolServices, region: &str) -> MediaAnalyzer {
    MediaAnalyzer::new(
        services.backends.converse(region),
        services.backends.objects(region),
    )
}
