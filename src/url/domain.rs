use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use article_relay::url::extract_domain;
///
/// let url = Url::parse("https://WWW.CNN.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.cnn.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if the URL's host contains the site domain
///
/// The check is a plain substring test on the lowercased host, so
/// `cnn.com` accepts `www.cnn.com` and `edition.cnn.com`.
pub fn host_contains_domain(url: &Url, site_domain: &str) -> bool {
    let site_domain = site_domain.trim().to_lowercase();
    if site_domain.is_empty() {
        return false;
    }

    extract_domain(url)
        .map(|host| host.contains(&site_domain))
        .unwrap_or(false)
}
