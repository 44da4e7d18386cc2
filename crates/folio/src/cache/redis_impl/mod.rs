//! Redis cache backend implementation.
//!
//! Provides a shared cache using Redis for multi-instance deployments.
//! Every namespace shares one connection manager and prefixes its keys.

mod cache;
mod error;

pub use cache::{connect, RedisCache};
