pub mod extract;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::FetchConfig;

/// Why a page produced no content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("no paragraph content extracted")]
    Empty,
}

impl FetchError {
    /// False when the request could not even be built (bad URL or scheme),
    /// so nothing reached the server.
    pub fn was_sent(&self) -> bool {
        !matches!(self, FetchError::Request(e) if e.is_builder())
    }
}

/// Retrieves the plain-text content behind a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches pages over HTTP with one bounded attempt per call.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_content_chars: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_content_chars: config.max_content_chars,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "Fetching");
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = resp.text().await?;
        let content = extract::extract_page_text(&html, self.max_content_chars);
        if content.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_request_error() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
        assert!(!err.was_sent());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_request_error() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let result = fetcher.fetch("ftp://example.com/page").await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[test]
    fn test_status_and_empty_count_as_sent() {
        assert!(FetchError::Status(503).was_sent());
        assert!(FetchError::Empty.was_sent());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Status(404).to_string(), "server returned status 404");
        assert_eq!(FetchError::Empty.to_string(), "no paragraph content extracted");
    }
}
