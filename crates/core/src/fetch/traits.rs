use async_trait::async_trait;
use serde_json::Value;

use super::error::Result;

/// Fetches a JSON resource from a remote API.
///
/// Implementations perform a single GET with no retries, map transport and
/// non-2xx failures to [`FetchError::Http`](super::FetchError::Http), parse
/// the body and apply [`ensure_non_empty`](super::ensure_non_empty).
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, url: &str, allow_empty_result: bool) -> Result<Value>;
}
