use crate::CrawlError;
use url::Url;

/// Scheme applied to seeds given without one (e.g. `example.com`)
pub const DEFAULT_SCHEME: &str = "http";

/// Parses the seed URL the crawl starts from
///
/// # Rules
///
/// 1. Surrounding whitespace is ignored
/// 2. A seed without a `scheme://` prefix gets [`DEFAULT_SCHEME`]
/// 3. Only `http` and `https` are accepted
/// 4. The URL must name a host
/// 5. Any fragment is dropped
///
/// # Arguments
///
/// * `seed` - The seed as typed by the user
///
/// # Returns
///
/// * `Ok(Url)` - The absolute seed URL
/// * `Err(CrawlError)` - The seed cannot start a crawl
///
/// # Examples
///
/// ```
/// use sitemapper::url::parse_seed;
///
/// let url = parse_seed("example.com/docs").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs");
/// ```
pub fn parse_seed(seed: &str) -> Result<Url, CrawlError> {
    let trimmed = seed.trim();

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|source| CrawlError::InvalidSeed {
        seed: seed.to_string(),
        source,
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CrawlError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(CrawlError::MissingHost {
            seed: seed.to_string(),
        });
    }

    url.set_fragment(None);
    Ok(url)
}
