//! Shared application state.

use std::sync::Arc;

use folio_ssr::Pipeline;

use crate::cache::CacheManager;

/// Shared application state, cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    /// Render pipeline for page requests.
    pub pipeline: Arc<Pipeline>,
    /// Cache namespaces, exposed for the invalidation endpoints.
    pub cache: Arc<CacheManager>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, cache: Arc<CacheManager>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            cache,
        }
    }
}
