use crate::UrlError;
use url::Url;

/// Normalizes a link scraped from a discussion page into a requestable URL
///
/// The href has already been entity-decoded by the HTML parser; parsing it
/// percent-encodes anything that is not valid in a URL (spaces, non-ASCII).
///
/// # Examples
///
/// ```
/// use hn_harvester::url::normalize_link;
///
/// let url = normalize_link(" https://example.com/a b?q=1&r=2 ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/a%20b?q=1&r=2");
/// ```
pub fn normalize_link(href: &str) -> Result<Url, UrlError> {
    let url = Url::parse(href.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    ensure_http(url)
}

/// Resolves a download target into an absolute URL
///
/// Targets that already carry a scheme are used as-is; anything else is treated
/// as an in-site link relative to the aggregator's home page
/// (`item?id=1` becomes `https://news.ycombinator.com/item?id=1`).
pub fn resolve_target(target: &str, base: &Url) -> Result<Url, UrlError> {
    let target = target.trim();
    match Url::parse(target) {
        Ok(url) => ensure_http(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(target)
            .map_err(|e| UrlError::Parse(e.to_string()))
            .and_then(ensure_http),
        Err(e) => Err(UrlError::Parse(e.to_string())),
    }
}

/// Builds the discussion page URL for a story id
pub fn discussion_url(base: &Url, id: u64) -> Result<Url, UrlError> {
    base.join(&format!("item?id={}", id))
        .map_err(|e| UrlError::Parse(e.to_string()))
}

fn ensure_http(url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }
    Ok(url)
}
