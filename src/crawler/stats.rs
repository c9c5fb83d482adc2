use crate::sitemap::CrawlStats;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Lock-free counters updated by the workers
#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    pages_fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    parse_failures: AtomicUsize,
    pages_indexed: AtomicUsize,
    links_discovered: AtomicUsize,
    duplicate_links: AtomicUsize,
}

impl StatsCollector {
    pub(crate) fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn parse_failed(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of pages indexed so far, including this one
    pub(crate) fn page_indexed(&self) -> usize {
        self.pages_indexed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn links_claimed(&self, discovered: usize, duplicates: usize) {
        self.links_discovered.fetch_add(discovered, Ordering::Relaxed);
        self.duplicate_links.fetch_add(duplicates, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, elapsed: Duration) -> CrawlStats {
        CrawlStats {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            pages_indexed: self.pages_indexed.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            duplicate_links: self.duplicate_links.load(Ordering::Relaxed),
            elapsed,
        }
    }
}
