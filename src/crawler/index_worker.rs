//! Index worker: page in, new URLs out
//!
//! Stores each fetched page in the sitemap, then claims every link on it. Claiming is the
//! sitemap's atomic check-and-insert, so when several workers race on the same link exactly
//! one of them enqueues it. URLs are pushed only after every sitemap operation for the page
//! has finished; the guard is never held while pushing.

use crate::crawler::fetch_worker::{FetchJob, IndexJob};
use crate::crawler::queue::WorkQueue;
use crate::crawler::stats::StatsCollector;
use crate::crawler::tracker::WorkTracker;
use crate::crawler::worker::WorkerContext;
use crate::sitemap::Sitemap;
use std::sync::Arc;

/// Log progress every this many indexed pages
const PROGRESS_INTERVAL: usize = 10;

pub(crate) struct IndexWorker {
    pub(crate) ctx: WorkerContext,
    pub(crate) pages: WorkQueue<IndexJob>,
    pub(crate) requests: WorkQueue<FetchJob>,
    pub(crate) sitemap: Arc<Sitemap>,
    pub(crate) tracker: WorkTracker,
    pub(crate) stats: Arc<StatsCollector>,
}

impl IndexWorker {
    /// A worker with the same id and queues, to take over after a panic
    pub(crate) fn replacement(&self) -> Self {
        Self {
            ctx: self.ctx.replacement(),
            pages: self.pages.clone(),
            requests: self.requests.clone(),
            sitemap: Arc::clone(&self.sitemap),
            tracker: self.tracker.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    pub(crate) async fn run(mut self) {
        tracing::trace!("[{}] started", self.ctx.id());

        while let Some(job) = self.ctx.next(&self.pages).await {
            self.process(job).await;
        }

        tracing::trace!("[{}] {:?}", self.ctx.id(), self.ctx.state());
    }

    async fn process(&self, job: IndexJob) {
        let id = self.ctx.id();
        let IndexJob { page, unit } = job;
        let links = page.links().to_vec();
        let page_url = page.url().clone();

        if !self.sitemap.store(page) {
            tracing::warn!("[{}] {} was already indexed", id, page_url);
        }
        tracing::debug!("[{}] indexed {}", id, page_url);

        let mut discovered = Vec::new();
        let mut duplicates = 0;
        for link in links {
            if self.sitemap.claim(&link) {
                tracing::trace!("[{}] claimed {}", id, link);
                discovered.push(FetchJob {
                    url: link,
                    unit: self.tracker.begin(),
                });
            } else {
                duplicates += 1;
            }
        }
        self.stats.links_claimed(discovered.len(), duplicates);

        for job in discovered {
            if let Err(e) = self.requests.push(job).await {
                tracing::error!("[{}] {}", id, e);
            }
        }

        let indexed = self.stats.page_indexed();
        if indexed % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} pages indexed, {} URLs outstanding",
                indexed,
                self.tracker.outstanding()
            );
        }

        // Released only after the new links hold their own units
        drop(unit);
    }
}
