//! Article-Relay: a paced homepage poller for a single news site
//!
//! This crate discovers article links on a site's homepage, extracts a
//! structured record from each article page and forwards the records to a
//! downstream storage service, remembering which URLs are already accounted for.

pub mod config;
pub mod crawler;
pub mod delivery;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Article-Relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP {status_code} from {url}")]
    HttpStatus { url: String, status_code: u16 },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl RelayError {
    /// Classifies a reqwest failure for the given URL
    pub fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{ArticleRecord, Coordinator};
pub use delivery::DeliveryResult;
pub use state::{PollState, SeenSet};
pub use crate::url::{is_article_path, normalize_article_url};
