use once_cell::sync::Lazy;
use regex::Regex;

/// Date segment of an article-shaped path: `/YYYY/MM/DD/`
static DATE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{4})/(\d{2})/(\d{2})/").expect("valid date segment regex"));

/// Checks if a URL path looks like an article
///
/// Article pages carry a `/YYYY/MM/DD/` date segment; index and listing
/// pages do not.
///
/// # Examples
///
/// ```
/// use article_relay::url::is_article_path;
///
/// assert!(is_article_path("/2024/05/01/tech/story/index.html"));
/// assert!(!is_article_path("/politics"));
/// ```
pub fn is_article_path(path: &str) -> bool {
    DATE_SEGMENT.is_match(path)
}

/// Builds a `YYYY-MM-DD` string from the first date segment of a path
pub fn date_from_path(path: &str) -> Option<String> {
    DATE_SEGMENT
        .captures(path)
        .map(|caps| format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}
