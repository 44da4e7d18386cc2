//! Redis cache implementation.
//!
//! Keys are stored as `{namespace}:{key}`. Each namespace tracks its keys in
//! a Redis Set so `reset` can clear the namespace without SCAN. The set
//! expires no earlier than the longest-lived entry it tracks, so members of
//! expired entries do not accumulate.
//!
//! `set`, `delete` and `reset` issue several commands and are not atomic. A
//! crash between them leaves at worst a stale member in the tracking set,
//! which a later `reset` deletes harmlessly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use folio_core::cache::{namespace_tracking_key, namespaced_key, Cache, Result};

use super::error::map_redis_error;

/// Opens a pooled connection to Redis.
///
/// # Errors
///
/// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
pub async fn connect(url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(url).map_err(map_redis_error)?;
    ConnectionManager::new(client).await.map_err(map_redis_error)
}

/// One namespace of a Redis-backed cache.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    namespace: Arc<str>,
    tracking_key: String,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager, namespace: &str) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
            tracking_key: namespace_tracking_key(namespace),
        }
    }

    fn key(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }
}

/// How the tracking set's expiry changes after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackingExpiry {
    /// The entry never expires, so neither does the set.
    Persist,
    /// Expire the set after this many milliseconds.
    Extend(u64),
    Keep,
}

/// `previous_pttl` is the set's `PTTL` before the write: `-2` when it did not
/// exist, `-1` when it has no expiry.
fn tracking_expiry(previous_pttl: i64, entry_ttl_ms: Option<u64>) -> TrackingExpiry {
    let Some(entry_ttl_ms) = entry_ttl_ms else {
        return TrackingExpiry::Persist;
    };

    match u64::try_from(previous_pttl) {
        Ok(remaining) if remaining >= entry_ttl_ms => TrackingExpiry::Keep,
        Ok(_) => TrackingExpiry::Extend(entry_ttl_ms),
        Err(_) if previous_pttl == -1 => TrackingExpiry::Keep,
        Err(_) => TrackingExpiry::Extend(entry_ttl_ms),
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(self.key(key)).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        // Redis rejects PEXPIRE values above i64::MAX
        let ttl_ms = ttl.map(|duration| {
            u64::try_from(duration.as_millis())
                .unwrap_or(u64::MAX)
                .clamp(1, i64::MAX as u64)
        });

        match ttl_ms {
            Some(millis) => {
                conn.pset_ex::<_, _, ()>(&key, value, millis)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(&key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        let previous_pttl: i64 = conn
            .pttl(&self.tracking_key)
            .await
            .map_err(map_redis_error)?;
        conn.sadd::<_, _, ()>(&self.tracking_key, &key)
            .await
            .map_err(map_redis_error)?;

        match tracking_expiry(previous_pttl, ttl_ms) {
            TrackingExpiry::Persist => {
                conn.persist::<_, ()>(&self.tracking_key)
                    .await
                    .map_err(map_redis_error)?;
            }
            TrackingExpiry::Extend(millis) => {
                conn.pexpire::<_, ()>(&self.tracking_key, millis as i64)
                    .await
                    .map_err(map_redis_error)?;
            }
            TrackingExpiry::Keep => {}
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = self.key(key);

        conn.del::<_, ()>(&key).await.map_err(map_redis_error)?;
        conn.srem::<_, _, ()>(&self.tracking_key, &key)
            .await
            .map_err(map_redis_error)?;

        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let mut conn = self.conn.clone();

        let tracked_keys: Vec<String> = conn
            .smembers(&self.tracking_key)
            .await
            .map_err(map_redis_error)?;

        if !tracked_keys.is_empty() {
            conn.del::<_, ()>(&tracked_keys)
                .await
                .map_err(map_redis_error)?;
        }

        conn.del::<_, ()>(&self.tracking_key)
            .await
            .map_err(map_redis_error)?;

        Ok(())
    }
}
