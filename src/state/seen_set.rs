use std::collections::HashSet;

/// In-memory record of article URLs already delivered (or already present
/// downstream) during the current process lifetime.
///
/// The set is owned by a single coordinator and is never persisted; a restart
/// forgets everything and the sink is expected to dedupe by URL.
#[derive(Debug, Default, Clone)]
pub struct SeenSet {
    urls: HashSet<String>,
}

impl SeenSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the normalized URL has already been accounted for
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Records a normalized URL
    ///
    /// Returns true if the URL was not in the set before. Entries are never
    /// removed.
    pub fn mark(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}
