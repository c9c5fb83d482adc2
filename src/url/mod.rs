//! URL handling for the crawl
//!
//! This module turns the user's seed string into an absolute URL and answers the two
//! questions the crawl asks of every discovered link: is it on the crawl's host, and which
//! sitemap path does it belong to.

mod host;
mod seed;

pub use host::{page_key, same_host};
pub use seed::{parse_seed, DEFAULT_SCHEME};
