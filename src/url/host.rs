use url::Url;

/// Returns true if both URLs point at the same host
///
/// Hosts are compared as the `url` crate stores them (already lowercased), together with
/// any explicit non-default port. `http://example.com` and `https://example.com` share a
/// host; `example.com:8080` and `example.com` do not.
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}

/// Returns the sitemap key for a URL
///
/// Pages are keyed by path alone, so query strings and fragments never create new entries.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemapper::url::page_key;
///
/// let url = Url::parse("https://example.com/docs?page=2#intro").unwrap();
/// assert_eq!(page_key(&url), "/docs");
/// ```
pub fn page_key(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
