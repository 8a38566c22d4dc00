//! Homepage link extraction
//!
//! Collects every `<a href>` on the homepage and keeps the ones that point
//! at an article on the polled site.

use crate::url::{host_contains_domain, is_article_path, normalize_article_url, strip_query_and_fragment};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Extracts the normalized article URLs linked from a homepage
///
/// # Link Rules
///
/// 1. `href` starting with `/` is resolved against `base_url`
/// 2. `href` starting with `http` is taken as absolute
/// 3. Anything else (`mailto:`, `javascript:`, `#frag`, `page.html`) is dropped
/// 4. The host must contain `site_domain` and the path must carry a
///    `/YYYY/MM/DD/` date segment
/// 5. Query string and fragment are stripped
///
/// The set is ordered lexicographically, which keeps per-poll capping
/// deterministic.
///
/// # Example
///
/// ```
/// use article_relay::crawler::extract_article_links;
/// use url::Url;
///
/// let html = r#"<a href="/2024/05/01/tech/story/index.html">Story</a><a href="/politics">Politics</a>"#;
/// let base_url = Url::parse("https://www.cnn.com").unwrap();
/// let links = extract_article_links(html, &base_url, "cnn.com");
/// assert_eq!(links.len(), 1);
/// ```
pub fn extract_article_links(html: &str, base_url: &Url, site_domain: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    for element in document.select(&ANCHOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(candidate) = resolve_candidate(href, base_url) else {
            continue;
        };

        if host_contains_domain(&candidate, site_domain) && is_article_path(candidate.path()) {
            links.insert(String::from(candidate));
        } else {
            tracing::trace!("Ignoring non-article link {}", candidate);
        }
    }

    links
}

/// Resolves an href to a normalized absolute URL, or None if it should be dropped
fn resolve_candidate(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.starts_with('/') {
        base_url.join(href).ok().map(strip_query_and_fragment)
    } else if href.starts_with("http") {
        normalize_article_url(href).ok()
    } else {
        None
    }
}
