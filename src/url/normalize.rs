use crate::UrlError;
use url::Url;

/// Normalizes an article URL into its canonical identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP(S)
/// 3. Reject URLs without a host
/// 4. Remove the query string
/// 5. Remove the fragment
///
/// Normalizing an already normalized URL yields the same string.
///
/// # Arguments
///
/// * `url_str` - The absolute URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse the URL or it is not a web URL
///
/// # Examples
///
/// ```
/// use article_relay::url::normalize_article_url;
///
/// let url = normalize_article_url("https://www.cnn.com/2024/05/01/tech/story?ref=home#top").unwrap();
/// assert_eq!(url.as_str(), "https://www.cnn.com/2024/05/01/tech/story");
/// ```
pub fn normalize_article_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(strip_query_and_fragment(url))
}

/// Drops the query string and fragment from an already parsed URL
pub fn strip_query_and_fragment(mut url: Url) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    url
}
