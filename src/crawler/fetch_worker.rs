//! Fetch worker: URL in, page out
//!
//! Pulls claimed URLs from the request queue, fetches and parses them, and pushes the
//! resulting [`Page`] onto the page queue. A failed fetch drops its URL for good. A fetched
//! page is never dropped: when the page queue is full the worker waits for room.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{PageParser, ParsedPage};
use crate::crawler::queue::WorkQueue;
use crate::crawler::stats::StatsCollector;
use crate::crawler::tracker::WorkUnit;
use crate::crawler::worker::WorkerContext;
use crate::sitemap::Page;
use crate::url::same_host;
use crate::ParseError;
use std::sync::Arc;
use url::Url;

/// A claimed URL waiting to be fetched
#[derive(Debug)]
pub(crate) struct FetchJob {
    pub(crate) url: Url,
    pub(crate) unit: WorkUnit,
}

/// A fetched page waiting to be indexed
#[derive(Debug)]
pub(crate) struct IndexJob {
    pub(crate) page: Page,
    pub(crate) unit: WorkUnit,
}

pub(crate) struct FetchWorker {
    pub(crate) ctx: WorkerContext,
    pub(crate) requests: WorkQueue<FetchJob>,
    pub(crate) pages: WorkQueue<IndexJob>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) parser: Arc<dyn PageParser>,
    pub(crate) domain: Url,
    pub(crate) stats: Arc<StatsCollector>,
}

impl FetchWorker {
    /// A worker with the same id and queues, to take over after a panic
    pub(crate) fn replacement(&self) -> Self {
        Self {
            ctx: self.ctx.replacement(),
            requests: self.requests.clone(),
            pages: self.pages.clone(),
            fetcher: Arc::clone(&self.fetcher),
            parser: Arc::clone(&self.parser),
            domain: self.domain.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    pub(crate) async fn run(mut self) {
        tracing::trace!("[{}] started", self.ctx.id());

        while let Some(job) = self.ctx.next(&self.requests).await {
            self.process(job).await;
        }

        tracing::trace!("[{}] {:?}", self.ctx.id(), self.ctx.state());
    }

    async fn process(&self, job: FetchJob) {
        let id = self.ctx.id();
        let FetchJob { url, unit } = job;

        let document = match self.fetcher.fetch(&url).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("[{}] request failed for {}: {}", id, url, e);
                self.stats.fetch_failed();
                return;
            }
        };
        tracing::debug!("[{}] requested {}", id, url);
        self.stats.page_fetched();

        let parsed = match self.parser.parse(&document) {
            Ok(parsed) => parsed,
            Err(e) => {
                match &e {
                    ParseError::NotHtml { .. } => tracing::debug!("[{}] {}: {}", id, url, e),
                    ParseError::Malformed(_) => {
                        tracing::warn!("[{}] failed to parse {}: {}", id, url, e)
                    }
                }
                self.stats.parse_failed();
                ParsedPage::default()
            }
        };

        let page = build_page(url, parsed, &self.domain);
        if let Err(e) = self.pages.push(IndexJob { page, unit }).await {
            tracing::error!("[{}] {}", id, e);
        }
    }
}

/// Builds a page, keeping only links and assets on the crawl's host
///
/// The parser already filters against the document's host, which differs from the crawl's
/// host when a fetch was redirected elsewhere.
pub(crate) fn build_page(url: Url, parsed: ParsedPage, domain: &Url) -> Page {
    let links = parsed
        .links
        .into_iter()
        .filter(|link| same_host(link, domain))
        .collect();
    let assets = parsed
        .assets
        .into_iter()
        .filter(|asset| same_host(asset, domain))
        .collect();
    Page::new(url, links, assets)
}
