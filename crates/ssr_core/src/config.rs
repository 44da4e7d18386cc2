//! Validated configuration and payload types.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsrCoreError, MAX_BOOTSTRAP_DATA_SIZE};
use crate::escape::escape_script_json;

/// Data snapshot embedded in the page as `window.__BOOTSTRAP_DATA__`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BootstrapPayload {
    data: serde_json::Value,
}

impl BootstrapPayload {
    /// Create a payload, validating that its serialized size is within limits.
    pub fn new(data: serde_json::Value) -> Result<Self> {
        let size = serde_json::to_string(&data)
            .map_err(|e| SsrCoreError::Serialization(e.to_string()))?
            .len();

        if size > MAX_BOOTSTRAP_DATA_SIZE {
            return Err(SsrCoreError::PayloadTooLarge {
                size,
                max: MAX_BOOTSTRAP_DATA_SIZE,
            });
        }

        Ok(Self { data })
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    pub fn into_data(self) -> serde_json::Value {
        self.data
    }

    /// Serialize to JSON that is safe inside a `<script>` element.
    pub fn to_script_json(&self) -> Result<String> {
        let json = serde_json::to_string(&self.data)
            .map_err(|e| SsrCoreError::Serialization(e.to_string()))?;
        Ok(escape_script_json(&json))
    }
}

/// Settings shared by every render (validated).
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Base URL of the upstream site, without trailing slash.
    pub site_url: String,
    /// Path between the site URL and endpoint fragments, without slashes.
    pub api_prefix: String,
    /// Manifest key of the client bundle.
    pub client_bundle: String,
    /// Default Cache-Control max-age in seconds.
    pub cache_control_max_age: u64,
}

impl PipelineConfig {
    /// Create and validate pipeline config.
    pub fn new(
        site_url: &str,
        api_prefix: &str,
        client_bundle: &str,
        cache_control_max_age: u64,
    ) -> Result<Self> {
        let site_url = site_url.trim_end_matches('/');
        if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
            return Err(SsrCoreError::InvalidConfig(format!(
                "site url must start with http:// or https://, got {site_url:?}"
            )));
        }
        if client_bundle.is_empty() {
            return Err(SsrCoreError::InvalidConfig(
                "client bundle name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            site_url: site_url.to_string(),
            api_prefix: api_prefix.trim_matches('/').to_string(),
            client_bundle: client_bundle.to_string(),
            cache_control_max_age,
        })
    }

    /// Create with defaults (`wp-json/wp/v2`, `client.js`, max-age 0).
    pub fn with_defaults(site_url: &str) -> Result<Self> {
        Self::new(site_url, "wp-json/wp/v2", "client.js", 0)
    }

    /// Full upstream URL for an endpoint fragment.
    pub fn api_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        if self.api_prefix.is_empty() {
            format!("{}/{}", self.site_url, endpoint)
        } else {
            format!("{}/{}/{}", self.site_url, self.api_prefix, endpoint)
        }
    }
}
