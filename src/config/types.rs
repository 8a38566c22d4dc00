use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Article-Relay
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// The single site being polled
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Homepage URL, also the base for resolving relative links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Substring every article host must contain (e.g. "cnn.com")
    pub domain: String,

    /// Author used when an article carries no author metadata
    #[serde(default = "default_site_name")]
    pub name: String,
}

/// Downstream storage service
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Endpoint receiving article records via POST
    pub endpoint: String,
}

/// Poll loop behavior
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds to sleep between full polls
    #[serde(rename = "scan-interval", default = "default_scan_interval")]
    pub scan_interval: u64,

    /// Maximum number of new articles processed per poll
    #[serde(rename = "max-articles-per-poll", default = "default_max_articles")]
    pub max_articles_per_poll: usize,

    /// Seconds to back off after a failed homepage fetch or iteration error
    #[serde(rename = "failure-backoff", default = "default_failure_backoff")]
    pub failure_backoff: u64,
}

impl PollConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            scan_interval: default_scan_interval(),
            max_articles_per_poll: default_max_articles(),
            failure_backoff: default_failure_backoff(),
        }
    }
}

/// An inclusive range of milliseconds a randomized delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const NONE: DelayRange = DelayRange { min: 0, max: 0 };

    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Returns true if the range never produces a delay
    pub fn is_zero(&self) -> bool {
        self.max == 0
    }
}

/// Randomized delays applied by the poll loop before outbound requests
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Jitter before every page request (homepage and articles)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: DelayRange,

    /// Extra pause between consecutive articles
    #[serde(rename = "article-delay", default = "default_article_delay")]
    pub article_delay: DelayRange,

    /// Pause before each delivery call
    #[serde(rename = "delivery-delay", default = "default_delivery_delay")]
    pub delivery_delay: DelayRange,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            request_delay: default_request_delay(),
            article_delay: default_article_delay(),
            delivery_delay: default_delivery_delay(),
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            referer: default_referer(),
        }
    }
}

fn default_site_name() -> String {
    "CNN".to_string()
}

fn default_scan_interval() -> u64 {
    300
}

fn default_max_articles() -> usize {
    15
}

fn default_failure_backoff() -> u64 {
    60
}

fn default_request_delay() -> DelayRange {
    DelayRange::new(1_500, 3_000)
}

fn default_article_delay() -> DelayRange {
    DelayRange::new(6_000, 10_000)
}

fn default_delivery_delay() -> DelayRange {
    DelayRange::NONE
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_referer() -> String {
    "https://www.google.com/".to_string()
}
