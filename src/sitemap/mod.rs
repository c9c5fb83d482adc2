//! Sitemap data model
//!
//! [`Sitemap`] is the only mutable state shared between workers while a crawl runs. It hands
//! out two atomic operations, claiming a path and storing a page, and is consumed into an
//! immutable [`Site`] once every worker has exited.

mod site;
mod store;

pub use site::{CrawlStats, Page, Site, SiteEntry};
pub use store::Sitemap;
