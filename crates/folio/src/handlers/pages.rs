//! The catch-all page handler.

use std::collections::BTreeMap;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use folio_ssr::{render_error_to_status_code, sanitize_error, PageRequest, RenderError};

use crate::state::AppState;

/// GET /{*path} - Render a page through the pipeline.
#[axum::debug_handler]
pub async fn render_page(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
    uri: Uri,
) -> Response {
    let request = page_request(&uri, query);

    match state.pipeline.render(&request).await {
        Ok(page) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, page.cache_control.header_value())],
            Html(page.document.into_markup()),
        )
            .into_response(),
        Err(err) => render_error_response(&request, &err),
    }
}

fn page_request(uri: &Uri, query: BTreeMap<String, String>) -> PageRequest {
    PageRequest {
        path: uri.path().to_string(),
        query,
    }
}

/// Template wrapper that converts Askama templates into HTML responses.
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {err}"),
            )
                .into_response(),
        }
    }
}

/// Minimal standalone error page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    code: u16,
    message: &'a str,
}

fn render_error_response(request: &PageRequest, err: &RenderError) -> Response {
    let status = StatusCode::from_u16(render_error_to_status_code(err))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match err {
        RenderError::Routing(_) | RenderError::Upstream { .. } => {
            tracing::warn!(path = %request.path, stage = %err.stage(), error = %err, "Page request failed");
        }
        _ => {
            tracing::error!(path = %request.path, stage = %err.stage(), error = %err, "Page render failed");
        }
    }

    let message = sanitize_error(err);
    (
        status,
        [(header::CACHE_CONTROL, "no-cache".to_string())],
        HtmlTemplate(ErrorPage {
            code: status.as_u16(),
            message: &message,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_escapes_message() {
        let html = ErrorPage {
            code: 404,
            message: "<b>gone</b> & 'lost'",
        }
        .render()
        .unwrap();

        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("&lt;b&gt;gone&lt;/b&gt; &amp;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_page_request_from_query_extractor() {
        let uri: Uri = "/search?q=hello%20world&tag=a+b&flag".parse().unwrap();
        let Query(query) = Query::<BTreeMap<String, String>>::try_from_uri(&uri).unwrap();

        let request = page_request(&uri, query);

        assert_eq!(request.path, "/search");
        assert_eq!(request.query.get("q").map(String::as_str), Some("hello world"));
        assert_eq!(request.query.get("tag").map(String::as_str), Some("a b"));
        assert_eq!(request.query.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_page_request_without_query() {
        let uri: Uri = "/posts/hello-world".parse().unwrap();
        let Query(query) = Query::<BTreeMap<String, String>>::try_from_uri(&uri).unwrap();

        let request = page_request(&uri, query);

        assert_eq!(request, PageRequest::new("/posts/hello-world"));
    }
}
