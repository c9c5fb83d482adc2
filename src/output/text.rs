use crate::sitemap::{Site, SiteEntry};
use std::fmt::Write;

/// Formats a site as an indented plain-text listing
///
/// ```text
/// https://example.com/:
///     /
///     LINKS
///         https://example.com/about
///     ASSETS
///         N/A (assets may be inlined)
/// ```
pub fn format_text_report(site: &Site) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", site.domain());

    for (path, entry) in site.entries() {
        let _ = writeln!(out, "\t{}", path);

        match entry {
            SiteEntry::Placeholder { .. } => {
                let _ = writeln!(out, "\t\tN/A (not fetched)");
            }
            SiteEntry::Indexed(page) => {
                let _ = writeln!(out, "\tLINKS");
                if page.links().is_empty() {
                    let _ = writeln!(out, "\t\tN/A (no links found)");
                }
                for link in page.links() {
                    let _ = writeln!(out, "\t\t{}", link);
                }

                let _ = writeln!(out, "\tASSETS");
                if page.assets().is_empty() {
                    let _ = writeln!(out, "\t\tN/A (assets may be inlined)");
                }
                for asset in page.assets() {
                    let _ = writeln!(out, "\t\t{}", asset);
                }
            }
        }

        out.push('\n');
    }

    out
}
