use crate::url::page_key;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// A crawled page with its same-host links and static assets
///
/// Pages are built once by a fetch worker and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    url: Url,
    links: Vec<Url>,
    assets: Vec<Url>,
}

impl Page {
    pub fn new(url: Url, links: Vec<Url>, assets: Vec<Url>) -> Self {
        Self { url, links, assets }
    }

    /// The URL the page was requested with
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Same-host links in document order (duplicates kept)
    pub fn links(&self) -> &[Url] {
        &self.links
    }

    /// Same-host static assets (images, scripts, stylesheets) in document order
    pub fn assets(&self) -> &[Url] {
        &self.assets
    }

    /// The sitemap key this page is stored under
    pub fn key(&self) -> String {
        page_key(&self.url)
    }
}

/// One entry of the sitemap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SiteEntry {
    /// Path claimed for fetching but never indexed (still in flight, or the fetch failed)
    Placeholder { url: Url },

    /// Page fetched and indexed
    Indexed(Page),
}

impl SiteEntry {
    /// The URL this entry was claimed or indexed with
    pub fn url(&self) -> &Url {
        match self {
            Self::Placeholder { url } => url,
            Self::Indexed(page) => page.url(),
        }
    }

    /// The indexed page, if any
    pub fn page(&self) -> Option<&Page> {
        match self {
            Self::Placeholder { .. } => None,
            Self::Indexed(page) => Some(page),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Counters collected while crawling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Successful fetches
    pub pages_fetched: usize,

    /// Fetches that failed and were dropped
    pub fetch_failures: usize,

    /// Fetched documents the parser rejected (stored without links or assets)
    pub parse_failures: usize,

    /// Pages stored by index workers
    pub pages_indexed: usize,

    /// Links that claimed a new path and were queued for fetching
    pub links_discovered: usize,

    /// Links whose path was already claimed
    pub duplicate_links: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

/// The finished sitemap of one host
///
/// Returned by [`crate::Crawler::crawl`]. Entries are ordered by path.
#[derive(Debug, Clone, Serialize)]
pub struct Site {
    domain: Url,
    entries: BTreeMap<String, SiteEntry>,
    stats: CrawlStats,
}

impl Site {
    pub(crate) fn new(
        domain: Url,
        entries: BTreeMap<String, SiteEntry>,
        stats: CrawlStats,
    ) -> Self {
        Self {
            domain,
            entries,
            stats,
        }
    }

    /// The seed URL the crawl started from
    pub fn domain(&self) -> &Url {
        &self.domain
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&SiteEntry> {
        self.entries.get(path)
    }

    /// Returns the indexed page at `path`
    pub fn page(&self, path: &str) -> Option<&Page> {
        self.entries.get(path).and_then(SiteEntry::page)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// All paths in the sitemap, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All entries, sorted by path
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SiteEntry)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Indexed pages only, sorted by path
    pub fn pages(&self) -> impl Iterator<Item = (&str, &Page)> {
        self.entries
            .iter()
            .filter_map(|(path, entry)| entry.page().map(|page| (path.as_str(), page)))
    }

    /// Paths that were claimed but never indexed
    pub fn unfetched(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_placeholder())
            .map(|(path, _)| path.as_str())
    }

    /// Returns true if both sites hold the same paths with the same content
    ///
    /// Statistics (timings in particular) are ignored.
    pub fn same_content(&self, other: &Site) -> bool {
        self.domain == other.domain && self.entries == other.entries
    }
}
