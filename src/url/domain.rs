use url::{Host, Url};

/// Returns true if a link points back at the aggregator itself
///
/// The link must use the aggregator's port. A domain host then matches when it is
/// the aggregator's registrable domain or any subdomain of it, so `www.ycombinator.com`
/// counts as self-referential for `news.ycombinator.com` while `rust-lang.github.io`
/// does not for `hn.github.io`. Hosts without a registrable domain (`localhost`,
/// IP addresses) must match exactly.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use hn_harvester::url::is_self_reference;
///
/// let site = Url::parse("https://news.ycombinator.com/").unwrap();
/// let link = Url::parse("https://www.ycombinator.com/apply").unwrap();
/// assert!(is_self_reference(&link, &site));
///
/// let link = Url::parse("https://example.com/").unwrap();
/// assert!(!is_self_reference(&link, &site));
/// ```
pub fn is_self_reference(link: &Url, site: &Url) -> bool {
    if link.port_or_known_default() != site.port_or_known_default() {
        return false;
    }

    match (link.host(), site.host()) {
        (Some(Host::Domain(link_host)), Some(Host::Domain(site_host))) => {
            let link_host = link_host.to_ascii_lowercase();
            let site_host = site_host.to_ascii_lowercase();
            match registrable_domain(&site_host) {
                Some(parent) => {
                    link_host == parent || link_host.ends_with(&format!(".{}", parent))
                }
                None => link_host == site_host,
            }
        }
        (Some(link_host), Some(site_host)) => link_host == site_host,
        _ => false,
    }
}

/// The registrable domain of a host: one label below its public suffix
fn registrable_domain(host: &str) -> Option<&str> {
    psl::domain_str(host.trim_end_matches('.'))
}
