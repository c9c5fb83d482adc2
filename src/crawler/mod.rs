//! Crawler module: the concurrent crawl engine
//!
//! This module contains the crawling machinery, including:
//! - The fetch and parse capabilities ([`Fetcher`], [`PageParser`]) and their defaults
//! - Fetch and index worker pools connected by work queues
//! - Quiescence detection that decides when the crawl is over
//! - The [`Crawler`] that dispatches all of the above

mod dispatcher;
mod fetch_worker;
mod fetcher;
mod index_worker;
mod monitor;
mod parser;
mod queue;
mod stats;
mod tracker;
mod worker;

pub use dispatcher::Crawler;
pub use fetcher::{build_http_client, FetchedDocument, Fetcher, HttpFetcher};
pub use parser::{parse_html, HtmlParser, PageParser, ParsedPage};
pub use worker::{StatusReport, WorkerId, WorkerKind, WorkerState};

use crate::config::Config;
use crate::sitemap::Site;
use crate::CrawlError;

/// Crawls `seed` over HTTP with the given configuration
///
/// This is the main entry point for a one-off crawl. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Parse the seed, applying the default scheme if needed
/// 3. Fetch, parse and index pages until no work is left
///
/// # Returns
///
/// * `Ok(Site)` - The finished sitemap
/// * `Err(CrawlError)` - Invalid configuration or seed
pub async fn crawl(seed: &str, config: Config) -> Result<Site, CrawlError> {
    Crawler::with_http(config)?.crawl(seed).await
}
