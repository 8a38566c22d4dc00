//! Delivery traits and result types

use crate::crawler::ArticleRecord;
use async_trait::async_trait;
use std::fmt;

/// Outcome of a delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The sink stored the article (HTTP 201)
    Created,

    /// The sink already had the article (HTTP 409)
    AlreadyExists,

    /// The sink answered with any other status
    Rejected(u16),

    /// The sink could not be reached
    Unreachable(String),
}

impl DeliveryResult {
    /// Maps a sink response status to a result
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            201 => Self::Created,
            409 => Self::AlreadyExists,
            other => Self::Rejected(other),
        }
    }

    /// Returns true if the article is stored downstream either way, which
    /// is what allows marking its URL as seen
    pub fn is_accounted_for(&self) -> bool {
        matches!(self, Self::Created | Self::AlreadyExists)
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AlreadyExists => write!(f, "already exists"),
            Self::Rejected(status) => write!(f, "rejected with HTTP {}", status),
            Self::Unreachable(reason) => write!(f, "unreachable: {}", reason),
        }
    }
}

/// Trait for downstream sinks
///
/// Delivery never fails with an error; every outcome, including transport
/// failure, is a `DeliveryResult`.
#[async_trait]
pub trait ArticleSink: Send + Sync {
    async fn deliver(&self, record: &ArticleRecord) -> DeliveryResult;
}
