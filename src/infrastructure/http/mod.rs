pub mod parser;

use crate::domain::entities::catalog::DataSource;
use crate::domain::entities::raw_item::SourcePayload;
use crate::domain::ports::source_fetcher::{FetchError, SourceFetcher};
use async_trait::async_trait;
use log::debug;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1000;
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Reqwest-backed source fetcher with bounded retry. One GET per attempt,
/// exponential backoff between attempts; after the last attempt the failure
/// propagates to the orchestrator. No side effects beyond the network call.
pub struct HttpSourceFetcher {
    client: reqwest::Client,
}

impl HttpSourceFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("ratewatch/0.1")
                .build()
                .unwrap_or_default(),
        }
    }

    async fn attempt(
        &self,
        source: &DataSource,
        fetch_id: &str,
    ) -> Result<SourcePayload, FetchError> {
        let timeout = Duration::from_millis(source.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));
        let mut request = self.client.get(&source.url).timeout(timeout);
        for (key, value) in &source.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Network(format!(
                "{} returned {}",
                source.name,
                resp.status()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let data = parser::normalize(source, &body)?;
        Ok(SourcePayload {
            source_id: source.id,
            category_id: source.category_id,
            fetch_id: fetch_id.to_string(),
            data,
        })
    }
}

impl Default for HttpSourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Only transport failures (including non-2xx statuses and timeouts) are
/// worth another attempt; a malformed payload or misconfigured source is
/// deterministic and fails the source immediately.
fn retryable(err: &FetchError) -> bool {
    matches!(err, FetchError::Network(_))
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, source: &DataSource, fetch_id: &str) -> Result<SourcePayload, FetchError> {
        let mut last_err = FetchError::Config(format!("{}: no attempt made", source.name));
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = BASE_BACKOFF_MS << (attempt - 1);
                debug!(
                    "source {}: attempt {} failed, retrying in {delay}ms",
                    source.name, attempt
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            match self.attempt(source, fetch_id).await {
                Ok(payload) => return Ok(payload),
                Err(e) if !retryable(&e) => return Err(e),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }
}
