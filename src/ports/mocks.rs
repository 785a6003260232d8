//! In-memory pair feeds for tests and offline runs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::pair_feed::{FeedError, PairFeed};
use crate::domain::RawListing;

/// Feed that returns a fixed set of listings and counts its calls
#[derive(Debug, Default)]
pub struct StaticFeed {
    name: &'static str,
    listings: Vec<RawListing>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticFeed {
    pub fn new(name: &'static str, listings: Vec<RawListing>) -> Self {
        Self {
            name,
            listings,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Build from raw JSON pair objects; non-objects are skipped
    pub fn from_json(name: &'static str, pairs: Vec<Value>) -> Self {
        Self::new(name, pairs.into_iter().filter_map(RawListing::from_value).collect())
    }

    /// Delay every response, to exercise concurrency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PairFeed for StaticFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_pairs(&self) -> Result<Vec<RawListing>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.listings.clone())
    }
}

/// Feed that always fails with the configured error kind
#[derive(Debug)]
pub struct FailingFeed {
    name: &'static str,
    status: Option<u16>,
}

impl FailingFeed {
    /// Fails with a network error
    pub fn new(name: &'static str) -> Self {
        Self { name, status: None }
    }

    /// Fails with a non-2xx status
    pub fn with_status(name: &'static str, status: u16) -> Self {
        Self {
            name,
            status: Some(status),
        }
    }
}

#[async_trait]
impl PairFeed for FailingFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_pairs(&self) -> Result<Vec<RawListing>, FeedError> {
        match self.status {
            Some(429) => Err(FeedError::RateLimited),
            Some(status) => Err(FeedError::Status(status)),
            None => Err(FeedError::Network("connection refused".to_string())),
        }
    }
}
