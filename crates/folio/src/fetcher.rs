//! Upstream JSON fetcher backed by `reqwest`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use folio_core::fetch::{parse_body, DataFetcher, FetchError, Result};
use serde_json::Value;

/// Fetches upstream JSON with a single GET per call and no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DataFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, allow_empty_result: bool) -> Result<Value> {
        let start = Instant::now();
        let result = self.get(url, allow_empty_result).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::debug!(url, elapsed_ms, "Upstream fetch complete"),
            Err(err) => tracing::debug!(url, elapsed_ms, error = %err, "Upstream fetch failed"),
        }

        result
    }
}

impl HttpFetcher {
    async fn get(&self, url: &str, allow_empty_result: bool) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        parse_body(&body, allow_empty_result)
    }
}
