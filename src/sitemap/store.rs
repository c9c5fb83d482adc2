use crate::sitemap::site::{CrawlStats, Page, Site, SiteEntry};
use crate::url::{page_key, same_host};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Shared, lock-guarded sitemap used while a crawl runs
///
/// Workers never see the map itself. Every operation takes the guard once, touches a single
/// entry and releases it, so the guard is never held across an `.await` or a queue push.
#[derive(Debug)]
pub struct Sitemap {
    domain: Url,
    entries: Mutex<HashMap<String, SiteEntry>>,
}

impl Sitemap {
    pub fn new(domain: Url) -> Self {
        Self {
            domain,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn domain(&self) -> &Url {
        &self.domain
    }

    /// Claims the path of `url` for fetching
    ///
    /// Checks membership and inserts a placeholder in one critical section. Exactly one
    /// caller gets `true` for a given path, which is what keeps a page from being fetched
    /// twice. URLs on another host are never claimed.
    ///
    /// # Returns
    ///
    /// * `true` - The path was new and the caller must enqueue the URL
    /// * `false` - The path is already known, or the URL is off-host
    pub fn claim(&self, url: &Url) -> bool {
        if !same_host(url, &self.domain) {
            return false;
        }

        let key = page_key(url);
        let mut entries = self.lock();
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, SiteEntry::Placeholder { url: url.clone() });
        true
    }

    /// Stores an indexed page at its path, replacing the placeholder
    ///
    /// Returns false if the path already held an indexed page.
    pub fn store(&self, page: Page) -> bool {
        let key = page.key();
        let previous = self.lock().insert(key, SiteEntry::Indexed(page));
        !matches!(previous, Some(SiteEntry::Indexed(_)))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consumes the sitemap into the finished [`Site`]
    pub fn into_site(self, stats: CrawlStats) -> Site {
        let entries = self
            .entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .collect::<BTreeMap<_, _>>();
        Site::new(self.domain, entries, stats)
    }

    /// Copies the current entries into a [`Site`] without consuming the sitemap
    pub fn snapshot(&self, stats: CrawlStats) -> Site {
        let entries = self
            .lock()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect::<BTreeMap<_, _>>();
        Site::new(self.domain.clone(), entries, stats)
    }

    // A worker that panicked mid-operation cannot leave an entry half-written, so a
    // poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SiteEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
