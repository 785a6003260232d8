//! DexScreener Adapter
//!
//! Production `PairFeed` backed by the public DexScreener REST API:
//! - cohort feed: the Solana pump.fun pairs listing
//! - search feed: keyword search for the Mayhem cohort
//!
//! Both are plain unauthenticated GETs. No retries here; a failed feed is
//! logged and skipped by the aggregator.

mod client;

pub use client::{
    parse_pairs_payload, DexScreenerFeed, DEFAULT_COHORT_URL, DEFAULT_SEARCH_URL,
    DEFAULT_USER_AGENT,
};
