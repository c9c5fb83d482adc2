//! Crawl dispatcher - wires the queues, worker pools and monitor together
//!
//! This module contains the entry point of a crawl:
//! - Validating the seed and configuration before anything is spawned
//! - Claiming and enqueueing the seed
//! - Spawning the fetch pool, the index pool and the quiescence monitor
//! - Waiting for every worker to exit and handing back the finished [`Site`]

use crate::config::{validate, Config, TerminationStrategy};
use crate::crawler::fetch_worker::{FetchJob, FetchWorker};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::index_worker::IndexWorker;
use crate::crawler::monitor::{DebounceMonitor, MonitorStrategy, QuiescenceMonitor};
use crate::crawler::parser::{HtmlParser, PageParser};
use crate::crawler::queue::WorkQueue;
use crate::crawler::stats::StatsCollector;
use crate::crawler::tracker::WorkTracker;
use crate::crawler::worker::{supervise, WorkerContext, WorkerId};
use crate::sitemap::{Site, Sitemap};
use crate::url::parse_seed;
use crate::CrawlError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Crawls one host with a pool of fetch workers and a pool of index workers
///
/// A `Crawler` can run any number of crawls; each call to [`Crawler::crawl`] builds its own
/// queues, workers and sitemap.
pub struct Crawler {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn PageParser>,
}

impl Crawler {
    /// Creates a crawler from explicit fetch and parse capabilities
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Configuration is valid
    /// * `Err(CrawlError)` - Configuration failed validation
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn PageParser>,
    ) -> Result<Self, CrawlError> {
        validate(&config)?;
        Ok(Self {
            config,
            fetcher,
            parser,
        })
    }

    /// Creates a crawler using [`HttpFetcher`] and [`HtmlParser`]
    pub fn with_http(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::new(config, Arc::new(fetcher), Arc::new(HtmlParser))
    }

    /// Crawls every same-host page reachable from `seed`
    ///
    /// The seed gets the default scheme when it has none. A seed that cannot be parsed fails
    /// the crawl before any worker starts; every later failure only costs the page it
    /// happened on.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitemapper::{Config, Crawler};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::with_http(Config::default())?;
    /// let site = crawler.crawl("example.com").await?;
    /// for path in site.paths() {
    ///     println!("{}", path);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, seed: &str) -> Result<Site, CrawlError> {
        let seed = parse_seed(seed)?;
        Ok(self.crawl_url(seed).await)
    }

    /// Crawls from an already parsed seed URL
    pub async fn crawl_url(&self, seed: Url) -> Site {
        let started = Instant::now();
        let settings = &self.config.crawler;

        tracing::info!(
            "Starting crawl of {} with {} fetch workers and {} index workers",
            seed,
            settings.fetch_workers,
            settings.index_workers
        );

        let sitemap = Arc::new(Sitemap::new(seed.clone()));
        let tracker = WorkTracker::new();
        let stats = Arc::new(StatsCollector::default());
        let shutdown = CancellationToken::new();
        let requests = WorkQueue::unbounded();
        let pages = WorkQueue::bounded(settings.page_queue_capacity);

        let (reports_tx, reports_rx) = match settings.termination {
            TerminationStrategy::Debounce => {
                let (tx, rx) = mpsc::unbounded_channel();
                (Some(tx), Some(rx))
            }
            TerminationStrategy::OutstandingWork => (None, None),
        };

        // The seed is claimed like any other link so a page linking back to it
        // cannot trigger a second fetch.
        sitemap.claim(&seed);
        if let Err(e) = requests
            .push(FetchJob {
                url: seed,
                unit: tracker.begin(),
            })
            .await
        {
            tracing::error!("Failed to enqueue seed: {}", e);
        }

        let mut workers = JoinSet::new();

        for index in 0..settings.fetch_workers {
            let worker = FetchWorker {
                ctx: WorkerContext::new(
                    WorkerId::fetch(index),
                    reports_tx.clone(),
                    shutdown.clone(),
                ),
                requests: requests.clone(),
                pages: pages.clone(),
                fetcher: Arc::clone(&self.fetcher),
                parser: Arc::clone(&self.parser),
                domain: sitemap.domain().clone(),
                stats: Arc::clone(&stats),
            };
            workers.spawn(supervise(
                WorkerId::fetch(index),
                shutdown.clone(),
                move || worker.replacement().run(),
            ));
        }

        for index in 0..settings.index_workers {
            let worker = IndexWorker {
                ctx: WorkerContext::new(
                    WorkerId::index(index),
                    reports_tx.clone(),
                    shutdown.clone(),
                ),
                pages: pages.clone(),
                requests: requests.clone(),
                sitemap: Arc::clone(&sitemap),
                tracker: tracker.clone(),
                stats: Arc::clone(&stats),
            };
            workers.spawn(supervise(
                WorkerId::index(index),
                shutdown.clone(),
                move || worker.replacement().run(),
            ));
        }
        drop(reports_tx);

        let strategy = match reports_rx {
            Some(reports) => MonitorStrategy::Debounce(DebounceMonitor::new(
                reports,
                settings.total_workers(),
                settings.debounce_interval(),
                settings.monitor_tick(),
            )),
            None => MonitorStrategy::OutstandingWork(tracker.clone()),
        };
        let monitor = tokio::spawn(QuiescenceMonitor::new(strategy, shutdown.clone()).run());

        // Completion barrier: every worker slot exits exactly once
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker supervisor exited abnormally: {}", e);
            }
        }

        // The monitor must not outlive the crawl
        shutdown.cancel();
        if let Err(e) = monitor.await {
            tracing::error!("Quiescence monitor exited abnormally: {}", e);
        }

        let stats = stats.snapshot(started.elapsed());
        let site = match Arc::try_unwrap(sitemap) {
            Ok(sitemap) => sitemap.into_site(stats),
            Err(shared) => shared.snapshot(stats),
        };

        tracing::info!(
            "Crawl completed: {} pages mapped ({} fetched, {} failed) in {:?}",
            site.len(),
            site.stats().pages_fetched,
            site.stats().fetch_failures,
            site.stats().elapsed
        );

        site
    }
}
