//! Pure functions for mapping fetch errors to HTTP status codes.

use super::FetchError;

/// Maps a [`FetchError`] to the status the page response should carry.
///
/// - `Http` with upstream 404 -> 404
/// - other `Http` -> 502 (Bad Gateway)
/// - `Parse` -> 502
/// - `EmptyResult` -> 404
///
/// ```
/// use folio_core::fetch::{fetch_error_to_status_code, FetchError};
///
/// assert_eq!(fetch_error_to_status_code(&FetchError::EmptyResult), 404);
/// ```
pub fn fetch_error_to_status_code(error: &FetchError) -> u16 {
    match error {
        FetchError::Http { status: 404, .. } => 404,
        FetchError::Http { .. } => 502,
        FetchError::Parse(_) => 502,
        FetchError::EmptyResult => 404,
    }
}
