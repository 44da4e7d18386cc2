//! Cache backend implementations and the namespace manager.
//!
//! This module provides concrete implementations of the cache trait defined
//! in `folio_core::cache`. The backend is chosen at startup: Redis when
//! `REDIS_URL` is set (and the `redis` feature is enabled), memory otherwise.

pub mod manager;
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use manager::{init_cache_manager, CacheManager};
