//! Crawler module for homepage polling and article processing
//!
//! This module contains the core relay logic, including:
//! - HTTP fetching with browser-like request headers
//! - Randomized request pacing
//! - Homepage link extraction
//! - Article extraction
//! - Poll loop coordination

mod article;
mod coordinator;
mod fetcher;
mod links;
mod pacing;

pub use article::{
    extract_article, extract_article_at, is_substantive, ArticleRecord, BOILERPLATE,
    MIN_CONTENT_CHARS, MIN_PARAGRAPH_CHARS,
};
pub use coordinator::{run_relay, Coordinator, CycleReport};
pub use fetcher::{build_http_client, FetchedPage, HttpFetcher, PageFetcher};
pub use links::extract_article_links;
pub use pacing::{sample_delay, Pacer, Sleeper, TokioSleeper};
