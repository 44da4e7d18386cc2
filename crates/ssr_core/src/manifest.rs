use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Result, SsrCoreError};

/// Bundler output map from asset name to public URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    assets: HashMap<String, String>,
}

impl AssetManifest {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SsrCoreError::InvalidManifest(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.assets.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest =
            AssetManifest::parse(r#"{"client.js": "/static/js/client.3f2a.js"}"#).unwrap();
        assert_eq!(manifest.get("client.js"), Some("/static/js/client.3f2a.js"));
        assert_eq!(manifest.get("vendor.js"), None);
    }

    #[test]
    fn test_parse_invalid_manifest() {
        assert!(matches!(
            AssetManifest::parse("[1, 2]"),
            Err(SsrCoreError::InvalidManifest(_))
        ));
    }
}
