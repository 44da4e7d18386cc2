use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised by the cache administration endpoints.
#[derive(Error, Debug)]
pub enum CacheAdminError {
    #[error("Unknown cache namespace: {0}")]
    UnknownNamespace(String),
}

pub fn cache_admin_error_to_status_code(error: &CacheAdminError) -> u16 {
    match error {
        CacheAdminError::UnknownNamespace(_) => 404,
    }
}

pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = if let Some(admin_error) = self.0.downcast_ref::<CacheAdminError>() {
            let code = cache_admin_error_to_status_code(admin_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
