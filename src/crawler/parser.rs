//! HTML parser for extracting links and static assets
//!
//! This module defines the [`PageParser`] capability and the default scraper-backed
//! [`HtmlParser`]. Only URLs on the document's own host are returned.

use crate::crawler::fetcher::FetchedDocument;
use crate::url::same_host;
use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Links and assets extracted from one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Same-host links to follow, in document order
    pub links: Vec<Url>,

    /// Same-host static assets (images, scripts, stylesheets, icons), in document order
    pub assets: Vec<Url>,
}

/// Capability to extract links and assets from a fetched document
///
/// A parse error is not fatal: the page is recorded without links or assets.
pub trait PageParser: Send + Sync {
    fn parse(&self, document: &FetchedDocument) -> Result<ParsedPage, ParseError>;
}

/// Default [`PageParser`] for HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl PageParser for HtmlParser {
    fn parse(&self, document: &FetchedDocument) -> Result<ParsedPage, ParseError> {
        if let Some(content_type) = &document.content_type {
            if !is_html(content_type) {
                return Err(ParseError::NotHtml {
                    content_type: content_type.clone(),
                });
            }
        }

        Ok(parse_html(&document.body, &document.final_url))
    }
}

/// Returns true for HTML and XHTML content types
fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Parses HTML content and extracts same-host links and assets
///
/// # Extraction Rules
///
/// **Links:**
/// - `<a href="...">`, except those with a `download` attribute
/// - `<link rel="canonical" href="...">`
///
/// **Assets:**
/// - `<img src="...">`
/// - `<script src="...">`
/// - any other `<link href="...">` (stylesheets, icons, preloads)
///
/// **Excluded:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` URLs
/// - Fragment-only links
/// - URLs on a different host than `base_url`
///
/// Fragments are stripped from links.
///
/// # Example
///
/// ```
/// use sitemapper::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><img src="/logo.png">"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/about");
/// assert_eq!(parsed.assets[0].as_str(), "https://example.com/logo.png");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document, base_url),
        assets: extract_assets(&document, base_url),
    }
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(mut link) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                link.set_fragment(None);
                links.push(link);
            }
        }
    }

    if let Ok(link_selector) = Selector::parse("link[href]") {
        for element in document.select(&link_selector) {
            if !is_canonical(element.value().attr("rel")) {
                continue;
            }

            if let Some(mut link) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                link.set_fragment(None);
                links.push(link);
            }
        }
    }

    links
}

fn extract_assets(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut assets = Vec::new();

    if let Ok(selector) = Selector::parse("img[src], script[src], link[href]") {
        for element in document.select(&selector) {
            let value = element.value();
            let target = match value.name() {
                "link" if is_canonical(value.attr("rel")) => None,
                "link" => value.attr("href"),
                _ => value.attr("src"),
            };

            if let Some(asset) = target.and_then(|src| resolve_link(src, base_url)) {
                assets.push(asset);
            }
        }
    }

    assets
}

fn is_canonical(rel: Option<&str>) -> bool {
    rel.map_or(false, |rel| {
        rel.split_whitespace()
            .any(|token| token.eq_ignore_ascii_case("canonical"))
    })
}

/// Resolves an attribute value to an absolute same-host URL
///
/// Returns None if the value should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - Fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
/// - URLs on another host
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    same_host(&absolute_url, base_url).then_some(absolute_url)
}
