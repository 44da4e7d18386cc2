//! Process-wide registry of named cache namespaces.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use folio_core::cache::{Cache, CacheHandle};
use tokio::sync::OnceCell;

use super::memory::MemoryCache;
use crate::config::Config;

static CACHE_MANAGER: OnceCell<Arc<CacheManager>> = OnceCell::const_new();

/// Initializes the process-wide cache manager.
///
/// The first call selects the backend; later calls return the same instance
/// and ignore their `config`.
pub async fn init_cache_manager(config: &Config) -> Arc<CacheManager> {
    CACHE_MANAGER
        .get_or_init(|| async { Arc::new(CacheManager::new(config).await) })
        .await
        .clone()
}

/// Per-namespace limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Maximum entries held by a memory namespace.
    pub max_items: NonZeroUsize,
    /// Default TTL for entries.
    pub max_age: Duration,
}

impl From<&Config> for NamespaceConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_items: config.cache_capacity(),
            max_age: config.cache_max_age(),
        }
    }
}

enum Backend {
    Memory,
    #[cfg(feature = "redis")]
    Redis(redis::aio::ConnectionManager),
}

/// Owns every namespace created in the process. Namespaces are never
/// removed, only cleared.
pub struct CacheManager {
    backend: Backend,
    defaults: NamespaceConfig,
    namespaces: RwLock<HashMap<String, CacheHandle>>,
}

impl CacheManager {
    /// Creates a manager, connecting to Redis when `REDIS_URL` is configured.
    ///
    /// An unreachable Redis falls back to the memory backend.
    pub async fn new(config: &Config) -> Self {
        let defaults = NamespaceConfig::from(config);

        let Some(url) = &config.redis_url else {
            return Self::memory(defaults);
        };

        #[cfg(feature = "redis")]
        {
            match super::redis_impl::connect(url).await {
                Ok(conn) => {
                    tracing::info!("Cache backend: redis");
                    return Self::with_backend(Backend::Redis(conn), defaults);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Redis unavailable, falling back to memory cache");
                }
            }
        }

        #[cfg(not(feature = "redis"))]
        {
            let _ = url;
            tracing::warn!("REDIS_URL is set but redis support is not compiled in");
        }

        Self::memory(defaults)
    }

    /// Creates a manager backed by process memory.
    pub fn memory(defaults: NamespaceConfig) -> Self {
        tracing::info!(
            max_items = defaults.max_items.get(),
            max_age_secs = defaults.max_age.as_secs(),
            "Cache backend: memory"
        );
        Self::with_backend(Backend::Memory, defaults)
    }

    fn with_backend(backend: Backend, defaults: NamespaceConfig) -> Self {
        Self {
            backend,
            defaults,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Memory => "memory",
            #[cfg(feature = "redis")]
            Backend::Redis(_) => "redis",
        }
    }

    /// Creates `name`, or returns the existing namespace with that name.
    pub fn create_namespace(&self, name: &str, config: Option<NamespaceConfig>) -> CacheHandle {
        let mut namespaces = self
            .namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = namespaces.get(name) {
            return existing.clone();
        }

        let config = config.unwrap_or(self.defaults);
        let backend: Arc<dyn Cache> = match &self.backend {
            Backend::Memory => Arc::new(MemoryCache::with_capacity(config.max_items)),
            #[cfg(feature = "redis")]
            Backend::Redis(conn) => Arc::new(super::redis_impl::RedisCache::new(conn.clone(), name)),
        };

        tracing::debug!(namespace = name, backend = self.backend_name(), "Cache namespace created");

        let handle = CacheHandle::new(name, backend, config.max_age);
        namespaces.insert(name.to_string(), handle.clone());
        handle
    }

    /// Looks up an existing namespace.
    pub fn namespace(&self, name: &str) -> Option<CacheHandle> {
        self.namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of every namespace, sorted.
    pub fn namespace_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Deletes one key in one namespace. Returns false if the namespace
    /// does not exist.
    pub async fn clear_key(&self, namespace: &str, key: &str) -> bool {
        match self.namespace(namespace) {
            Some(handle) => {
                handle.delete(key).await;
                true
            }
            None => false,
        }
    }

    /// Clears every namespace. Failures are logged by each handle.
    pub async fn reset_all(&self) {
        let handles: Vec<CacheHandle> = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        futures_util::future::join_all(handles.iter().map(CacheHandle::reset)).await;
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("backend", &self.backend_name())
            .field("defaults", &self.defaults)
            .field("namespaces", &self.namespace_names())
            .finish()
    }
}
