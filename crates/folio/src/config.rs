use std::{env, num::NonZeroUsize, time::Duration};

const DEFAULT_CACHE_MAX_ITEM_COUNT: usize = 100;
const DEFAULT_CACHE_MAX_AGE_SECONDS: u64 = 1;

/// Cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum entries per memory namespace (default: 100)
    pub cache_max_item_count: usize,
    /// Entry TTL in seconds (default: 1)
    pub cache_max_age_seconds: u64,
    /// Redis connection URL. When set, namespaces are stored in Redis.
    pub redis_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_MAX_ITEM_COUNT` - Maximum entries per namespace (default: 100)
    /// - `CACHE_MAX_AGE` - Entry TTL in seconds (default: 1)
    /// - `REDIS_URL` - Redis connection URL (default: unset, memory backend)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_max_item_count: lookup("CACHE_MAX_ITEM_COUNT")
                .and_then(|v| v.parse().ok())
                .filter(|count| *count > 0)
                .unwrap_or(DEFAULT_CACHE_MAX_ITEM_COUNT),
            cache_max_age_seconds: lookup("CACHE_MAX_AGE")
                .and_then(|v| v.parse().ok())
                .filter(|age| *age > 0)
                .unwrap_or(DEFAULT_CACHE_MAX_AGE_SECONDS),
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_seconds)
    }

    pub fn cache_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_max_item_count).unwrap_or(NonZeroUsize::MIN)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_item_count: DEFAULT_CACHE_MAX_ITEM_COUNT,
            cache_max_age_seconds: DEFAULT_CACHE_MAX_AGE_SECONDS,
            redis_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = from_vars(&[]);

        assert_eq!(config, Config::default());
        assert_eq!(config.cache_max_item_count, 100);
        assert_eq!(config.cache_max_age(), Duration::from_secs(1));
        assert_eq!(config.redis_url, None);
    }

    #[test]
    fn test_values_from_env() {
        let config = from_vars(&[
            ("CACHE_MAX_ITEM_COUNT", "500"),
            ("CACHE_MAX_AGE", "30"),
            ("REDIS_URL", "redis://cache:6379"),
        ]);

        assert_eq!(config.cache_max_item_count, 500);
        assert_eq!(config.cache_max_age(), Duration::from_secs(30));
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_vars(&[
            ("CACHE_MAX_ITEM_COUNT", "0"),
            ("CACHE_MAX_AGE", "soon"),
            ("REDIS_URL", ""),
        ]);

        assert_eq!(config, Config::default());
        assert_eq!(config.cache_capacity().get(), 100);
    }
}
