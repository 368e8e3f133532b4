//! Where the directory table comes from.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use panelgate_contracts::error::{GateError, GateResult};

/// Fetches one snapshot of the directory table as text.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch(&self) -> GateResult<String>;
}

/// Settings for the remote directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// URL of the exported table.
    pub url: String,
    /// Column delimiter.
    pub delimiter: char,
    /// Upper bound on the single fetch attempt.
    pub timeout_ms: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            delimiter: ',',
            timeout_ms: 5_000,
        }
    }
}

/// A table fetched with one HTTP GET. Non-2xx responses are errors.
#[derive(Debug, Clone)]
pub struct HttpTableSource {
    client: Client,
    url: String,
}

impl HttpTableSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> GateResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Config {
                reason: format!("failed to build directory HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &DirectoryConfig) -> GateResult<Self> {
        if config.url.is_empty() {
            return Err(GateError::Config {
                reason: "directory url is not set".to_string(),
            });
        }
        Self::new(config.url.clone(), Duration::from_millis(config.timeout_ms))
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    async fn fetch(&self) -> GateResult<String> {
        debug!(url = %self.url, "fetching directory table");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GateError::Directory {
                reason: format!("directory request failed: {e}"),
            })?;

        response.text().await.map_err(|e| GateError::Directory {
            reason: format!("failed to read directory response: {e}"),
        })
    }
}

/// A fixed table, for tests and offline runs.
#[derive(Debug, Clone)]
pub struct StaticTableSource(pub String);

#[async_trait]
impl TableSource for StaticTableSource {
    async fn fetch(&self) -> GateResult<String> {
        Ok(self.0.clone())
    }
}
