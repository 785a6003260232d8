//! Source Aggregator
//!
//! Queries every configured pair feed concurrently, merges and de-duplicates
//! the listings, narrows them to the Mayhem cohort, ranks by volume and
//! normalizes the survivors. Always returns a usable batch: when nothing
//! comes back from upstream the fallback generator fills in.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::adapters::dexscreener::DexScreenerFeed;
use crate::config::RadarConfig;
use crate::domain::{
    generate_mock_tokens_with, ranking_volume, PairNormalizer, RawListing, RelevanceClassifier,
    TokenBatch, DEFAULT_MOCK_COUNT,
};
use crate::ports::{FeedError, PairFeed};

/// Most tokens returned from one live aggregation
pub const DEFAULT_MAX_RESULTS: usize = 80;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No listings returned ({failed} of {total} feeds failed)")]
    NoListings { failed: usize, total: usize },
}

/// Tunables for one aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorSettings {
    pub max_results: usize,
    pub mock_count: usize,
    /// Seed for fallback draws; entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            mock_count: DEFAULT_MOCK_COUNT,
            rng_seed: None,
        }
    }
}

/// Listings left after relevance filtering and ranking
#[derive(Debug, Clone)]
pub struct RankedListings {
    pub listings: Vec<RawListing>,
    /// False when nothing matched the cohort and the unfiltered set was kept
    pub cohort_filtered: bool,
}

/// Fetches and normalizes the live token batch
pub struct TokenAggregator {
    feeds: Vec<Arc<dyn PairFeed>>,
    normalizer: PairNormalizer,
    classifier: RelevanceClassifier,
    settings: AggregatorSettings,
}

impl TokenAggregator {
    /// Aggregator over `feeds` with default normalizer, keyword and limits.
    /// Feed order matters: on duplicate pairs the earlier feed wins.
    pub fn new(feeds: Vec<Arc<dyn PairFeed>>) -> Self {
        Self {
            feeds,
            normalizer: PairNormalizer::default(),
            classifier: RelevanceClassifier::default(),
            settings: AggregatorSettings::default(),
        }
    }

    /// Wire the two DexScreener feeds and pipeline settings from config
    pub fn from_config(config: &RadarConfig) -> Result<Self, FeedError> {
        let timeout = Duration::from_secs(config.feed.timeout_secs);
        let cohort = DexScreenerFeed::with_user_agent(
            "cohort",
            config.feed.get_cohort_url(),
            timeout,
            &config.feed.user_agent,
        )?;
        let search = DexScreenerFeed::with_user_agent(
            "search",
            config.feed.get_search_url(),
            timeout,
            &config.feed.user_agent,
        )?;

        Ok(Self::new(vec![Arc::new(cohort), Arc::new(search)])
            .with_normalizer(PairNormalizer::new(config.pipeline.normalizer_config()))
            .with_classifier(RelevanceClassifier::new(&config.pipeline.keyword))
            .with_settings(config.pipeline.aggregator_settings()))
    }

    pub fn with_normalizer(mut self, normalizer: PairNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_classifier(mut self, classifier: RelevanceClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_settings(mut self, settings: AggregatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// One full aggregation. Never fails; check `TokenBatch::source`.
    pub async fn fetch_tokens(&self) -> TokenBatch {
        let mut rng = match self.settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.fetch_tokens_with(&mut rng, Utc::now()).await
    }

    /// Aggregation with an injected generator and clock
    pub async fn fetch_tokens_with<R: Rng + ?Sized + Send>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> TokenBatch {
        let merged = match self.collect_listings().await {
            Ok(listings) => listings,
            Err(e) => {
                warn!("{}; serving {} simulated tokens", e, self.settings.mock_count);
                return TokenBatch::mock(generate_mock_tokens_with(
                    self.settings.mock_count,
                    now,
                    rng,
                ));
            }
        };

        let ranked = self.rank_listings(merged);
        let tokens = ranked
            .listings
            .iter()
            .enumerate()
            .map(|(index, listing)| self.normalizer.normalize(listing, index, now, rng))
            .collect::<Vec<_>>();

        info!(
            tokens = tokens.len(),
            cohort_filtered = ranked.cohort_filtered,
            "Live Mayhem batch ready"
        );
        TokenBatch::live(tokens, ranked.cohort_filtered)
    }

    /// Query every feed concurrently and merge the results. A failing feed
    /// contributes nothing; only an empty merge is an error.
    pub async fn collect_listings(&self) -> Result<Vec<RawListing>, AggregateError> {
        let results = join_all(self.feeds.iter().map(|feed| feed.fetch_pairs())).await;

        let mut failed = 0;
        let mut batches = Vec::with_capacity(results.len());
        for (feed, result) in self.feeds.iter().zip(results) {
            match result {
                Ok(pairs) => {
                    debug!(feed = feed.name(), pairs = pairs.len(), "Feed responded");
                    batches.push(pairs);
                }
                Err(e) => {
                    failed += 1;
                    warn!(feed = feed.name(), "Feed request failed: {}", e);
                }
            }
        }

        let merged = merge_listings(batches);
        if merged.is_empty() {
            return Err(AggregateError::NoListings {
                failed,
                total: self.feeds.len(),
            });
        }
        Ok(merged)
    }

    /// Cohort filter with unfiltered fallback, stable volume ranking and
    /// truncation to `max_results`.
    pub fn rank_listings(&self, listings: Vec<RawListing>) -> RankedListings {
        let total = listings.len();
        let relevant: Vec<RawListing> = listings
            .iter()
            .filter(|l| self.classifier.is_relevant(l))
            .cloned()
            .collect();

        let cohort_filtered = !relevant.is_empty();
        let pool = if cohort_filtered {
            relevant
        } else {
            info!(
                listings = total,
                keyword = self.classifier.keyword(),
                "No cohort match; keeping unfiltered listings"
            );
            listings
        };

        let mut scored: Vec<(f64, RawListing)> =
            pool.into_iter().map(|l| (ranking_volume(&l), l)).collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(self.settings.max_results);

        RankedListings {
            listings: scored.into_iter().map(|(_, l)| l).collect(),
            cohort_filtered,
        }
    }
}

/// Concatenate feed batches, keeping the first listing for each pair key.
/// Listings without any key are all kept.
pub fn merge_listings(batches: Vec<Vec<RawListing>>) -> Vec<RawListing> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for listing in batches.into_iter().flatten() {
        if let Some(key) = listing.dedup_key() {
            if !seen.insert(key.to_string()) {
                continue;
            }
        }
        merged.push(listing);
    }

    merged
}
