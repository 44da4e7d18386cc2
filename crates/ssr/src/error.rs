//! Render errors and their mapping to client-facing responses.

use folio_core::fetch::{fetch_error_to_status_code, FetchError};
use folio_core::routing::RoutingError;
use folio_ssr_core::SsrCoreError;
use thiserror::Error;

use crate::stage::Stage;
use crate::view::ViewError;

/// Terminal failure of a render, tagged by the stage that failed.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("Upstream fetch of {url} failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Preload failed: {0}")]
    Preload(#[source] ViewError),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Document assembly failed: {0}")]
    Document(#[from] SsrCoreError),
}

impl RenderError {
    /// The stage in which the render failed.
    pub fn stage(&self) -> Stage {
        match self {
            RenderError::Routing(_) => Stage::ResolvingRoute,
            RenderError::Upstream { .. } => Stage::FetchingData,
            RenderError::Preload(_) => Stage::PreloadingSubcomponents,
            RenderError::Render(_) => Stage::Rendering,
            RenderError::Document(_) => Stage::AssemblingDocument,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Maps a [`RenderError`] to the HTTP status of the page response.
///
/// - `Routing` -> 404
/// - `Upstream` -> see [`fetch_error_to_status_code`]
/// - `Preload`, `Render`, `Document` -> 500
pub fn render_error_to_status_code(error: &RenderError) -> u16 {
    match error {
        RenderError::Routing(_) => 404,
        RenderError::Upstream { source, .. } => fetch_error_to_status_code(source),
        RenderError::Preload(_) | RenderError::Render(_) | RenderError::Document(_) => 500,
    }
}

/// Sanitize error messages for client-facing responses.
///
/// Hides internal details while providing useful feedback.
pub fn sanitize_error(error: &RenderError) -> String {
    match error {
        // Safe to expose
        RenderError::Routing(_) => "Page not found".to_string(),
        RenderError::Upstream { source, .. } if fetch_error_to_status_code(source) == 404 => {
            "Page not found".to_string()
        }
        // Hide internal details
        RenderError::Upstream { .. } => "Upstream service unavailable".to_string(),
        RenderError::Preload(_) | RenderError::Render(_) => "Render failed".to_string(),
        RenderError::Document(_) => "Internal configuration error".to_string(),
    }
}

/// Route table entries that do not fit the registered views and documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineBuildError {
    #[error("Route {route:?} uses unknown view {view:?}")]
    UnknownView { route: String, view: String },

    #[error("Route {route:?} uses unknown document {document:?}")]
    UnknownDocument { route: String, document: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(source: FetchError) -> RenderError {
        RenderError::Upstream {
            url: "https://example.com/wp-json/wp/v2/posts?slug=x".to_string(),
            source,
        }
    }

    #[test]
    fn test_routing_maps_to_404() {
        let error = RenderError::Routing(RoutingError::NoMatch {
            path: "/nope".to_string(),
        });
        assert_eq!(render_error_to_status_code(&error), 404);
        assert_eq!(error.stage(), Stage::ResolvingRoute);
        assert_eq!(sanitize_error(&error), "Page not found");
    }

    #[test]
    fn test_upstream_mapping() {
        let empty = upstream(FetchError::EmptyResult);
        assert_eq!(render_error_to_status_code(&empty), 404);
        assert_eq!(sanitize_error(&empty), "Page not found");

        let down = upstream(FetchError::Http {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        });
        assert_eq!(render_error_to_status_code(&down), 502);
        assert_eq!(sanitize_error(&down), "Upstream service unavailable");
        assert_eq!(down.stage(), Stage::FetchingData);
    }

    #[test]
    fn test_render_hides_details() {
        let error = RenderError::Render("thread panicked at src/views.rs:42".to_string());
        assert_eq!(render_error_to_status_code(&error), 500);
        assert_eq!(sanitize_error(&error), "Render failed");
    }

    #[test]
    fn test_document_error() {
        let error = RenderError::from(SsrCoreError::UnknownDocument("plain".to_string()));
        assert_eq!(render_error_to_status_code(&error), 500);
        assert_eq!(error.stage(), Stage::AssemblingDocument);
        assert_eq!(sanitize_error(&error), "Internal configuration error");
    }
}
