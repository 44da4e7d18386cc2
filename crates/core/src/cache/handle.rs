//! Namespace handle with degrade-to-miss semantics.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use super::{Cache, CacheError};

/// A named, independently configured cache namespace.
///
/// Every operation swallows backend failures: errors are logged at debug level
/// and surface as a miss (`get`) or a no-op (`set`, `delete`, `reset`). A cache
/// outage therefore never fails a render.
#[derive(Clone)]
pub struct CacheHandle {
    name: Arc<str>,
    backend: Arc<dyn Cache>,
    default_ttl: Duration,
}

impl CacheHandle {
    /// Wraps a backend as the namespace `name` with a default TTL.
    pub fn new(name: impl Into<Arc<str>>, backend: Arc<dyn Cache>, default_ttl: Duration) -> Self {
        Self {
            name: name.into(),
            backend,
            default_ttl,
        }
    }

    /// Returns the namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the TTL applied when `set` is called without an override.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Gets raw bytes. Absent, expired and failed lookups are all `None`.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(namespace = %self.name, key, error = %err, "Cache get failed");
                None
            }
        }
    }

    /// Stores raw bytes, using the namespace default TTL unless overridden.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Err(err) = self.backend.set(key, value, Some(ttl)).await {
            tracing::debug!(namespace = %self.name, key, error = %err, "Cache set failed");
        }
    }

    /// Deletes a key.
    pub async fn delete(&self, key: &str) {
        tracing::debug!(namespace = %self.name, key, "Cache cleared");
        if let Err(err) = self.backend.delete(key).await {
            tracing::debug!(namespace = %self.name, key, error = %err, "Cache delete failed");
        }
    }

    /// Clears every key in the namespace.
    pub async fn reset(&self) {
        tracing::debug!(namespace = %self.name, "Cache reset");
        if let Err(err) = self.backend.reset().await {
            tracing::debug!(namespace = %self.name, error = %err, "Cache reset failed");
        }
    }

    /// Gets and deserializes a JSON value. Undecodable bytes are a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                let err = CacheError::Serialization(err.to_string());
                tracing::debug!(namespace = %self.name, key, error = %err, "Cache value undecodable");
                None
            }
        }
    }

    /// Serializes a value as JSON and stores it.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, &bytes, ttl).await,
            Err(err) => {
                let err = CacheError::Serialization(err.to_string());
                tracing::debug!(namespace = %self.name, key, error = %err, "Cache value unserializable");
            }
        }
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("name", &self.name)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
