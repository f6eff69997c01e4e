//! HTTP fetches for BIMI logos and MTA-STS policy files

use crate::config::HttpConfig;
use crate::error::{CheckError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches the body of a URL
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and return the body as text
    ///
    /// Transport failures and non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Production fetcher backed by reqwest
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher from the `[http]` configuration section
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CheckError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("HTTP GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                warn!("HTTP GET {} failed: {}", url, e);
                CheckError::Http(e.to_string())
            })?;

        response
            .text()
            .await
            .map_err(|e| CheckError::Http(format!("Failed to read body of {}: {}", url, e)))
    }
}
