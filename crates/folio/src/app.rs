use std::{path::PathBuf, time::Duration};

use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        cache::{clear_key, reset_all},
        health::{healthz, livez},
        pages::render_page,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
///
/// Every path not claimed by a probe, cache endpoint or `/public` asset is
/// handed to the render pipeline.
pub fn create_app(state: AppState, public_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .route("/_cache/reset", post(reset_all))
        .route("/_cache/{namespace}/{key}", delete(clear_key))
        .route("/", get(render_page))
        .route("/{*path}", get(render_page));

    if let Some(dir) = public_dir {
        router = router.nest_service("/public", ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
