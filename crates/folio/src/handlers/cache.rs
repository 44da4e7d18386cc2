//! Cache invalidation endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use super::error::{AppError, CacheAdminError};
use crate::state::AppState;

/// POST /_cache/reset - Clear every namespace.
#[axum::debug_handler]
pub async fn reset_all(State(state): State<AppState>) -> StatusCode {
    state.cache.reset_all().await;
    tracing::info!("All cache namespaces reset");
    StatusCode::NO_CONTENT
}

/// DELETE /_cache/{namespace}/{key} - Clear one key.
#[axum::debug_handler]
pub async fn clear_key(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    if !state.cache.clear_key(&namespace, &key).await {
        return Err(CacheAdminError::UnknownNamespace(namespace).into());
    }

    tracing::info!(namespace = %namespace, key = %key, "Cache key cleared");
    Ok(StatusCode::NO_CONTENT)
}
