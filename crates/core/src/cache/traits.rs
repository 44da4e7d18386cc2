use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for a single cache backend instance.
///
/// One instance backs one namespace. Implementations must tolerate concurrent
/// calls from many in-flight requests.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key. Expired entries are a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL (`None` never expires).
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every value held by this cache.
    async fn reset(&self) -> Result<()>;
}
