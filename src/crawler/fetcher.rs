//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made during a harvest:
//! - The [`Fetch`] capability the controller depends on
//! - A reqwest-backed implementation with sane timeouts
//!
//! Any error at this boundary is fatal to the run. HTTP error statuses are
//! not: the body is handed on, and extraction decides whether it holds
//! what it needs.

use crate::HarvestError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Page body content
    pub body: String,
}

/// Transport capability used by the harvester
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` sending `headers`
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - A response arrived, whatever its status
    /// * `Err(HarvestError)` - The request could not be completed
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchedPage, HarvestError>;
}

/// Builds the HTTP client used by [`HttpFetcher`]
///
/// Headers are supplied per request by the session, so none are set here.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetch`] implementation
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, HarvestError> {
        let client = build_http_client().map_err(HarvestError::Client)?;
        Ok(Self { client })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchedPage, HarvestError> {
        let http_error = |source| HarvestError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            tracing::debug!("{} answered with HTTP {}", url, status.as_u16());
        }

        let body = response.text().await.map_err(http_error)?;

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn test_http_fetcher_new() {
        let fetcher = HttpFetcher::new().unwrap();
        assert!(format!("{:?}", fetcher).contains("Client"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_fatal() {
        let fetcher = HttpFetcher::new().unwrap();
        // Port 9 (discard) on localhost is not expected to be listening
        let result = fetcher
            .fetch("http://127.0.0.1:9/page", &HeaderMap::new())
            .await;
        match result {
            Err(HarvestError::Http { url, .. }) => assert_eq!(url, "http://127.0.0.1:9/page"),
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }
}
