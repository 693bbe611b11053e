use std::sync::Arc;

use crate::services::{
    providers::CatalogProvider,
    store::{ExclusionStore, ReaderShelfStore},
    RecommendationEngine,
};

/// Shared application state
///
/// Holds only trait objects and the engine built from them, so tests can
/// assemble a router over in-memory collaborators.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub exclusions: Arc<dyn ExclusionStore>,
    pub shelf: Arc<dyn ReaderShelfStore>,
}

impl AppState {
    pub fn new(
        engine: RecommendationEngine,
        catalog: Arc<dyn CatalogProvider>,
        exclusions: Arc<dyn ExclusionStore>,
        shelf: Arc<dyn ReaderShelfStore>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            catalog,
            exclusions,
            shelf,
        }
    }
}
