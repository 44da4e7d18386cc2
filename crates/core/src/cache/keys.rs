/// Returns the backend key for `key` inside `namespace`.
///
/// Shared backends (Redis) hold every namespace in one keyspace, so keys are
/// prefixed with the namespace name.
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{}:{}", namespace, key)
}

/// Returns the set key tracking every key written to `namespace`.
///
/// Resetting a namespace reads this set instead of scanning the keyspace.
pub fn namespace_tracking_key(namespace: &str) -> String {
    format!("_folio:{}:keys", namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key() {
        assert_eq!(namespaced_key("api", "posts"), "api:posts");
    }

    #[test]
    fn test_namespace_tracking_key() {
        assert_eq!(namespace_tracking_key("api"), "_folio:api:keys");
    }

    #[test]
    fn test_tracking_key_outside_namespace_prefix() {
        let tracking = namespace_tracking_key("api");
        assert!(!tracking.starts_with("api:"));
    }
}
