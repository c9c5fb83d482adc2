//! Markdown report generation
//!
//! Produces a human-readable summary of a crawl: statistics first, then one section per
//! indexed page, then the paths that could not be fetched.

use crate::sitemap::Site;
use chrono::{DateTime, Utc};

/// Formats a site as markdown
///
/// # Arguments
///
/// * `site` - The finished site
/// * `generated_at` - Timestamp written into the header
pub fn format_markdown_report(site: &Site, generated_at: DateTime<Utc>) -> String {
    let stats = site.stats();
    let mut md = String::new();

    // Title
    md.push_str(&format!("# Sitemap of {}\n\n", site.domain()));

    // Crawl statistics
    md.push_str("## Crawl Statistics\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Paths Mapped**: {}\n", site.len()));
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.pages_fetched));
    md.push_str(&format!("- **Fetch Failures**: {}\n", stats.fetch_failures));
    md.push_str(&format!("- **Parse Failures**: {}\n", stats.parse_failures));
    md.push_str(&format!(
        "- **Links Discovered**: {} ({} duplicates skipped)\n\n",
        stats.links_discovered, stats.duplicate_links
    ));

    // Pages
    md.push_str("## Pages\n\n");
    for (path, page) in site.pages() {
        md.push_str(&format!("### `{}`\n\n", path));

        md.push_str("**Links**\n\n");
        if page.links().is_empty() {
            md.push_str("_None_\n\n");
        } else {
            for link in page.links() {
                md.push_str(&format!("- <{}>\n", link));
            }
            md.push('\n');
        }

        md.push_str("**Assets**\n\n");
        if page.assets().is_empty() {
            md.push_str("_None_\n\n");
        } else {
            for asset in page.assets() {
                md.push_str(&format!("- <{}>\n", asset));
            }
            md.push('\n');
        }
    }

    let unfetched: Vec<&str> = site.unfetched().collect();
    if !unfetched.is_empty() {
        md.push_str("## Not Fetched\n\n");
        for path in unfetched {
            md.push_str(&format!("- `{}`\n", path));
        }
        md.push('\n');
    }

    md
}
