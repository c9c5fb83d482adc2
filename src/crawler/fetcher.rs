//! HTTP fetcher implementation
//!
//! This module defines the [`Fetcher`] capability the fetch workers call, and the default
//! reqwest-backed [`HttpFetcher`]:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests following a bounded number of redirects
//! - Error classification
//!
//! Failed fetches are not retried.

use crate::config::Config;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL that was requested
    pub url: Url,

    /// URL after redirects; relative links resolve against this
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

/// Capability to fetch a page
///
/// Implementations must be cheap to share between workers. A call that never returns
/// stalls the worker that made it, so implementations should bound their own latency.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError>;
}

/// Builds an HTTP client from the configuration
///
/// # Example
///
/// ```no_run
/// use sitemapper::config::Config;
/// use sitemapper::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .connect_timeout(Duration::from_secs(config.http.connect_timeout_secs))
        .redirect(Policy::limited(config.http.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | `Ok` with body and Content-Type |
    /// | Other status | `FetchError::Status` |
    /// | Timeout | `FetchError::Timeout` |
    /// | Connection refused / DNS / TLS | `FetchError::Connect` |
    /// | Too many redirects, other | `FetchError::Network` |
    /// | Body read failure | `FetchError::Body` |
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchedDocument {
            url: url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if e.is_timeout() {
        FetchError::Timeout { url }
    } else if e.is_connect() {
        FetchError::Connect { url }
    } else {
        FetchError::Network {
            url,
            message: e.to_string(),
        }
    }
}
