use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RawListing;

/// Errors from one upstream pair feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream responded with status {0}")]
    Status(u16),

    #[error("Rate limited")]
    RateLimited,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// A source of raw pair listings.
///
/// Implementations perform one request per call and never retry; the
/// aggregator decides what a failure means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairFeed: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Fetch the current listings
    async fn fetch_pairs(&self) -> Result<Vec<RawListing>, FeedError>;
}
