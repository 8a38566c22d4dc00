//! Article page extraction
//!
//! Turns an article page into an [`ArticleRecord`], or `None` when the page
//! does not look like a real article. The heuristics cascade through
//! fallbacks so that markup differences between article templates do not need
//! template-specific parsers.

use crate::url::date_from_path;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

/// Paragraphs must be strictly longer than this to count as content
pub const MIN_PARAGRAPH_CHARS: usize = 40;

/// Joined content shorter than this is an extraction failure
pub const MIN_CONTENT_CHARS: usize = 200;

/// Paragraphs containing any of these (case-insensitive) are boilerplate
pub const BOILERPLATE: &[&str] = &["subscribe", "cookie", "newsletter", "advertisement"];

const PARAGRAPH_SEPARATOR: &str = "\n\n";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid static selector")
}

static NOISE: Lazy<Selector> =
    Lazy::new(|| selector("script, style, noscript, nav, header, footer, aside"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h1"));
static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static AUTHOR: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="author"]"#));
static PUBLISHED: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="article:published_time"]"#));
static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

/// A structured article ready for delivery
///
/// Serializes as `{url, title, author, date, content}`. A record always has a
/// non-empty title and at least [`MIN_CONTENT_CHARS`] characters of content;
/// anything else can not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    url: String,
    title: String,
    author: String,
    #[serde(rename = "date")]
    published: String,
    content: String,
}

impl ArticleRecord {
    /// Builds a record, returning None if the title is empty or the content
    /// is below the minimum length
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        published: impl Into<String>,
        content: impl Into<String>,
    ) -> Option<Self> {
        let title = title.into().trim().to_string();
        let content = content.into();

        if title.is_empty() || content.chars().count() < MIN_CONTENT_CHARS {
            return None;
        }

        Some(Self {
            url: url.into(),
            title,
            author: author.into(),
            published: published.into(),
            content,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// ISO-8601 date or date-time
    pub fn published(&self) -> &str {
        &self.published
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Extracts an article record from a page, stamping undated pages with the
/// current time
///
/// # Arguments
///
/// * `html` - The article page
/// * `url` - The normalized article URL
/// * `site_name` - Author used when the page has no author metadata
///
/// # Example
///
/// ```
/// use article_relay::crawler::extract_article;
///
/// let html = "<html><body><p>Too short</p></body></html>";
/// assert!(extract_article(html, "https://www.cnn.com/2024/05/01/x", "CNN").is_none());
/// ```
pub fn extract_article(html: &str, url: &str, site_name: &str) -> Option<ArticleRecord> {
    extract_article_at(html, url, site_name, Utc::now())
}

/// Same as [`extract_article`] with an explicit clock for the last-resort date
pub fn extract_article_at(
    html: &str,
    url: &str,
    site_name: &str,
    now: DateTime<Utc>,
) -> Option<ArticleRecord> {
    let mut document = Html::parse_document(html);
    strip_noise(&mut document);

    // Detached subtrees stay in the node arena, so everything below walks
    // descendants of the root element rather than the whole document.
    let root = document.root_element();

    let title = extract_title(root)?;
    let author = meta_content(root, &AUTHOR).unwrap_or_else(|| site_name.to_string());
    let published = extract_published(root, url, now);
    let content = extract_content(root);

    ArticleRecord::new(url, title, author, published, content)
}

/// Detaches script, style and page-chrome subtrees from the document
fn strip_noise(document: &mut Html) {
    let noise: Vec<_> = document
        .root_element()
        .select(&NOISE)
        .map(|element| element.id())
        .collect();

    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// First `h1` text, else `og:title`
fn extract_title(root: ElementRef) -> Option<String> {
    root.select(&HEADING)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .or_else(|| meta_content(root, &OG_TITLE))
}

/// `article:published_time`, else the URL's date segment, else `now`
fn extract_published(root: ElementRef, url: &str, now: DateTime<Utc>) -> String {
    meta_content(root, &PUBLISHED)
        .or_else(|| {
            Url::parse(url)
                .ok()
                .and_then(|parsed| date_from_path(parsed.path()))
        })
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Substantive paragraphs from the article container, or the whole page
fn extract_content(root: ElementRef) -> String {
    let paragraphs: Vec<ElementRef> = match root.select(&ARTICLE).next() {
        Some(article) => article.select(&PARAGRAPH).collect(),
        None => root.select(&PARAGRAPH).collect(),
    };

    paragraphs
        .into_iter()
        .map(element_text)
        .filter(|text| is_substantive(text))
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

/// Long enough and free of boilerplate keywords
pub fn is_substantive(paragraph: &str) -> bool {
    if paragraph.chars().count() <= MIN_PARAGRAPH_CHARS {
        return false;
    }

    let lowered = paragraph.to_lowercase();
    !BOILERPLATE.iter().any(|word| lowered.contains(word))
}

/// Trimmed, non-empty `content` attribute of the first matching meta tag
fn meta_content(root: ElementRef, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Concatenated element text, trimmed at both ends
fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
