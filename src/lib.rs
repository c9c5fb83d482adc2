//! Sitemapper: a concurrent same-host sitemap builder
//!
//! This crate crawls every page reachable from a seed URL without leaving the seed's host,
//! recording each page's same-host links and static assets. Pages are fetched and indexed by
//! two worker pools that feed each other through queues, and a quiescence monitor decides when
//! the crawl is finished.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only errors that abort the whole crawl end up here. Failures of a single page
/// (see [`FetchError`] and [`ParseError`]) are logged and the crawl carries on.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{seed}': {source}")]
    InvalidSeed {
        seed: String,
        source: ::url::ParseError,
    },

    #[error("Unsupported seed scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("Seed URL '{seed}' has no host")]
    MissingHost { seed: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors produced by a [`crawler::Fetcher`]
///
/// A fetch error drops its URL from the crawl. There is no retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Errors produced by a [`crawler::PageParser`]
///
/// The crawl treats these as a page without links or assets.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Content type '{content_type}' is not HTML")]
    NotHtml { content_type: String },

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Report rendering errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Crawler};
pub use sitemap::{CrawlStats, Page, Site, SiteEntry};
pub use url::{page_key, parse_seed, same_host};
