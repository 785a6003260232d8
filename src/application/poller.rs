//! Token Poller
//!
//! Periodic consumer of the aggregator, holding the latest snapshot for a
//! dashboard. Starts from a synthetic batch so there is something to show
//! before the first network round-trip completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::aggregator::TokenAggregator;
use crate::domain::{generate_mock_tokens, sort_by_created_desc, CanonicalToken, FeedSource};

/// Default refresh period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Shown while the dashboard is serving simulated data
pub const MOCK_NOTICE: &str = "DexScreener Mayhem feed unavailable. Displaying simulated radar \
                               data until connectivity returns.";

/// What a dashboard renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSnapshot {
    /// Newest first
    pub tokens: Vec<CanonicalToken>,
    pub source: FeedSource,
    pub cohort_filtered: bool,
    /// None until the first refresh completes
    pub last_updated: Option<DateTime<Utc>>,
    pub notice: Option<String>,
}

impl RadarSnapshot {
    fn initial(mock_count: usize) -> Self {
        let mut tokens = generate_mock_tokens(mock_count);
        sort_by_created_desc(&mut tokens);
        Self {
            tokens,
            source: FeedSource::Mock,
            cohort_filtered: false,
            last_updated: None,
            notice: None,
        }
    }
}

/// Result of a `refresh` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated(FeedSource),
    /// Another refresh was already in flight; nothing was done
    Coalesced,
}

/// Polls the aggregator and keeps the latest snapshot
#[derive(Clone)]
pub struct TokenPoller {
    aggregator: Arc<TokenAggregator>,
    snapshot: Arc<RwLock<RadarSnapshot>>,
    in_flight: Arc<AtomicBool>,
    is_running: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
    poll_interval: Duration,
}

impl TokenPoller {
    pub fn new(aggregator: Arc<TokenAggregator>) -> Self {
        let initial = RadarSnapshot::initial(aggregator.settings().mock_count);
        Self {
            aggregator,
            snapshot: Arc::new(RwLock::new(initial)),
            in_flight: Arc::new(AtomicBool::new(false)),
            is_running: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(Notify::new()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> RadarSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Fetch a fresh batch and replace the snapshot. Returns immediately
    /// with `Coalesced` if another refresh is still running.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return RefreshOutcome::Coalesced;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let batch = self.aggregator.fetch_tokens().await;
        let source = batch.source;
        let mut tokens = batch.tokens;
        sort_by_created_desc(&mut tokens);

        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.tokens = tokens;
            snapshot.source = source;
            snapshot.cohort_filtered = batch.cohort_filtered;
            snapshot.last_updated = Some(Utc::now());
            snapshot.notice = match source {
                FeedSource::Mock => Some(MOCK_NOTICE.to_string()),
                FeedSource::Live => None,
            };
        }

        RefreshOutcome::Updated(source)
    }

    /// Refresh every poll interval until `stop` is called
    pub async fn run(&self) {
        *self.is_running.write().await = true;
        self.poll_loop().await;
    }

    /// Mark the poller running, then drive it on a background task. A
    /// `stop` issued after this returns always ends the loop.
    pub async fn spawn(&self) -> JoinHandle<()> {
        *self.is_running.write().await = true;
        let poller = self.clone();
        tokio::spawn(async move { poller.poll_loop().await })
    }

    async fn poll_loop(&self) {
        info!("Starting token poller - interval: {:?}", self.poll_interval);

        while *self.is_running.read().await {
            match self.refresh().await {
                RefreshOutcome::Updated(FeedSource::Mock) => {
                    warn!("Poll cycle served simulated data")
                }
                RefreshOutcome::Updated(FeedSource::Live) => {
                    let snapshot = self.snapshot.read().await;
                    info!("Poll cycle: {} live tokens", snapshot.tokens.len());
                }
                RefreshOutcome::Coalesced => {}
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.shutdown.notified() => {}
            }
        }

        info!("Token poller stopped");
    }

    /// Stop the loop, waking it if it is sleeping between cycles
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        self.shutdown.notify_one();
    }
}

/// Clears the in-flight flag when a refresh finishes or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
