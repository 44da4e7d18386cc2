//! Render Orchestrator - Imperative Shell.
//!
//! This crate drives a request through the render state machine using pure
//! functions from `folio_core` (routing, fetch policy) and `folio_ssr_core`
//! (styles, escaping, document assembly).
//!
//! # Architecture
//!
//! - **Functional Core** (`folio_core`, `folio_ssr_core`): Pure routing, validation, assembly
//! - **Imperative Shell** (this crate): upstream fetches, cache access, manifest reads
//!
//! # Example
//!
//! ```ignore
//! use folio_ssr::{PageRequest, Pipeline, PipelineConfig, ViewRegistry};
//!
//! let pipeline = Pipeline::builder(PipelineConfig::with_defaults("https://example.com")?, fetcher)
//!     .routes(routes)
//!     .views(views)
//!     .cache(cache_manager.create_namespace("api", None))
//!     .build()?;
//!
//! let page = pipeline.render(&PageRequest::new("/posts/hello-world")).await?;
//! println!("{}", page.document.into_markup());
//! ```

mod error;
mod loadable;
mod pipeline;
mod stage;
mod view;

// Re-export core types for convenience
pub use folio_ssr_core::{
    Document, DocumentRegistry, DocumentTemplate, HeadMetadata, HeadTag, PipelineConfig,
    SsrCoreError, StyleRegistry,
};

// Export shell types
pub use error::{
    render_error_to_status_code, sanitize_error, PipelineBuildError, RenderError, Result,
};
pub use loadable::Loadable;
pub use pipeline::{CacheControl, PageRequest, Pipeline, PipelineBuilder, RenderedPage};
pub use stage::Stage;
pub use view::{RenderContext, RenderScope, View, ViewError, ViewRegistry};
