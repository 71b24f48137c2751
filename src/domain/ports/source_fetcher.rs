use crate::domain::entities::catalog::DataSource;
use crate::domain::entities::raw_item::SourcePayload;
use async_trait::async_trait;

/// Fetches and normalizes one source's payload. Implementations own their
/// retry policy; a returned error means the source is definitively failed
/// for this run.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &DataSource, fetch_id: &str) -> Result<SourcePayload, FetchError>;
}

#[derive(Debug)]
pub enum FetchError {
    /// HTTP transport error or non-2xx status
    Network(String),
    /// Response body did not parse or lacked the expected shape
    Parse(String),
    /// Source misconfiguration (bad header value, etc.)
    Config(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "Network error: {msg}"),
            FetchError::Parse(msg) => write!(f, "Parse error: {msg}"),
            FetchError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}
