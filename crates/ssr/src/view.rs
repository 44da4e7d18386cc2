//! The two-phase view protocol: async preload, then synchronous render.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use folio_core::routing::{Params, RouteOptions};
use folio_ssr_core::{HeadMetadata, StyleRegistry};
use thiserror::Error;

/// Failure raised by a view while preloading or rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ViewError {
    message: String,
}

impl ViewError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Request data handed to a view.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Request path without the query string.
    pub path: String,
    pub params: Params,
    pub query: BTreeMap<String, String>,
    /// Upstream data, when the route has an endpoint.
    pub data: Option<serde_json::Value>,
    pub options: RouteOptions,
}

/// Mutable per-request state a view writes into while rendering.
#[derive(Debug, Default)]
pub struct RenderScope {
    pub head: HeadMetadata,
    pub styles: StyleRegistry,
}

/// A page component.
///
/// `preload` runs first and may await; it is where lazily loaded
/// sub-views are resolved. `render` must not block and returns the view's
/// markup.
#[async_trait]
pub trait View: Send + Sync {
    async fn preload(&self, _ctx: &RenderContext) -> Result<(), ViewError> {
        Ok(())
    }

    fn render(&self, ctx: &RenderContext, scope: &mut RenderScope) -> Result<String, ViewError>;
}

/// Views addressable by the id routes refer to.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<String, Arc<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, view: impl View + 'static) -> &mut Self {
        self.views.insert(id.into(), Arc::new(view));
        self
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn View>> {
        self.views.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.views.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl std::fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.views.keys().collect();
        ids.sort();
        f.debug_struct("ViewRegistry").field("views", &ids).finish()
    }
}
