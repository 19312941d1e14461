//! Subscription fetching over HTTP(S).
//!
//! One GET per source with a fixed timeout and optional User-Agent. There
//! are no retries; any failure is reported to the caller, which skips the
//! source.

use anyhow::{Context, Result};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Options for building a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// User-Agent header, if any.
    pub user_agent: Option<String>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: None,
            use_system_proxy: true,
        }
    }
}

/// Why a remote source produced no content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Whether `value` can be sent as a User-Agent header.
pub fn is_valid_user_agent(value: &str) -> bool {
    !value.trim().is_empty() && reqwest::header::HeaderValue::from_str(value).is_ok()
}

/// Fetches subscription bodies.
pub struct Fetcher {
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl Fetcher {
    /// Build a fetcher with a shared HTTP client.
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(options.timeout_seconds));

        if let Some(ref user_agent) = options.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        if !options.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout_seconds: options.timeout_seconds,
        })
    }

    /// GET `url` and return the trimmed body text.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify_error(url, e))?;

        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body.trim().to_string())
    }

    fn classify_error(&self, url: &Url, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout_seconds,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: e,
            }
        }
    }
}
