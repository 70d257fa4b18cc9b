//! HTTP downloads for vendor install scripts and release binaries
//!
//! This module provides:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries)
//! - Atomic writes of the downloaded file

use crate::atomic;
use crate::error::DownloadError;
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Default timeout for a download (2 minutes)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("depcheck/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// Trait for fetching a remote file to disk
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` and atomically write it to `dest`
    async fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// HTTP downloader with retry logic
#[derive(Clone)]
pub struct HttpDownloader {
    client: Client,
    max_retries: u32,
}

impl HttpDownloader {
    /// Create a new downloader with default settings
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new downloader with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                DownloadError::network("", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Fetch the body of `url` with retry logic
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.fetch_once(url).await {
                Ok(bytes) => return Ok(bytes),
                Err((error, retryable)) => {
                    if !retryable {
                        return Err(error);
                    }
                    tracing::debug!(url, attempt, error = %error, "download attempt failed");
                    last_error = Some(error);

                    if attempt < self.max_retries {
                        // Wait before retrying with exponential backoff
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DownloadError::network(url, "unknown error")))
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, (DownloadError, bool)> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                (
                    DownloadError::Timeout {
                        url: url.to_string(),
                    },
                    true,
                )
            } else {
                (DownloadError::network(url, e.to_string()), true)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            // Client errors will not get better by retrying, except rate limiting
            let retryable =
                status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
            return Err((
                DownloadError::network(url, format!("HTTP {}", status)),
                retryable,
            ));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| (DownloadError::network(url, e.to_string()), true))
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        tracing::debug!(url, dest = %dest.display(), "downloading");
        let bytes = self.fetch(url).await?;
        atomic::write_file(dest, &bytes).map_err(|e| DownloadError::write(dest, e))
    }
}
