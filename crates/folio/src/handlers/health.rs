//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Route and cache summary (passive, no upstream calls)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub routes: usize,
    pub cache_backend: &'static str,
    pub cache_namespaces: Vec<String>,
}

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Route count and cache backend.
///
/// Does not contact the upstream API, so it stays fast when the upstream is
/// slow or down.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        routes: state.pipeline.routes().len(),
        cache_backend: state.cache.backend_name(),
        cache_namespaces: state.cache.namespace_names(),
    })
}
