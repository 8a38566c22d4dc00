//! URL handling module for Article-Relay
//!
//! This module provides article URL normalization, host extraction and
//! article-shaped path matching.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, host_contains_domain};
pub use matcher::{date_from_path, is_article_path};
pub use normalize::{normalize_article_url, strip_query_and_fragment};
