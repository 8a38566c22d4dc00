//! Request pacing
//!
//! Every outbound request is preceded by a randomized pause so the relay's
//! traffic has a human browsing cadence. Sleeping goes through the `Sleeper`
//! trait so the poll loop can run without real delays under test.

use crate::config::{DelayRange, PacingConfig};
use async_trait::async_trait;
use rand::{rng, Rng};
use std::sync::Arc;
use std::time::Duration;

/// Something that can wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Draws a delay uniformly from an inclusive millisecond range
pub fn sample_delay(range: DelayRange) -> Duration {
    if range.is_zero() {
        return Duration::ZERO;
    }

    let ms = if range.min >= range.max {
        range.max
    } else {
        rng().random_range(range.min..=range.max)
    };

    Duration::from_millis(ms)
}

/// Applies the configured pauses before homepage, article and delivery requests
#[derive(Clone)]
pub struct Pacer {
    config: PacingConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl Pacer {
    pub fn new(config: PacingConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { config, sleeper }
    }

    /// Pause before any page request
    pub async fn before_request(&self) {
        self.pause("request", self.config.request_delay).await;
    }

    /// Pause between consecutive articles
    pub async fn before_article(&self) {
        self.pause("article", self.config.article_delay).await;
    }

    /// Pause before a delivery call
    pub async fn before_delivery(&self) {
        self.pause("delivery", self.config.delivery_delay).await;
    }

    /// Waits for an arbitrary duration through the same sleeper
    pub async fn wait(&self, duration: Duration) {
        self.sleeper.sleep(duration).await;
    }

    async fn pause(&self, kind: &str, range: DelayRange) {
        let delay = sample_delay(range);
        if delay.is_zero() {
            return;
        }

        tracing::trace!("Pacing {} delay: {}ms", kind, delay.as_millis());
        self.sleeper.sleep(delay).await;
    }
}
