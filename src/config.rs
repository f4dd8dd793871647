//! Client configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Result format requested from SPARQL protocol endpoints.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Sizing and endpoint settings for a [`crate::client::GraphClient`].
///
/// Every field has a default, so a JSON config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Number of dispatcher worker threads
    pub workers: usize,
    /// Capacity of the admission queue in front of the workers
    pub queue_capacity: usize,
    /// Per-query deadline in milliseconds, 0 waits without bound
    pub timeout_ms: u64,
    /// Maximum entries held by each cache tier
    pub cache_capacity: u64,
    /// SPARQL protocol endpoint, e.g. `http://localhost:7878/query`
    pub http_endpoint: Option<String>,
    /// Value of the `format` request parameter sent to the endpoint
    pub result_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            workers: 50,
            queue_capacity: 50,
            timeout_ms: 0,
            cache_capacity: 100_000,
            http_endpoint: None,
            result_format: SPARQL_RESULTS_JSON.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if let Some(endpoint) = &self.http_endpoint {
            reqwest::Url::parse(endpoint)
                .map_err(|e| Error::Config(format!("invalid http_endpoint '{}': {}", endpoint, e)))?;
        }
        Ok(())
    }

    /// The per-query deadline, `None` when unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}
