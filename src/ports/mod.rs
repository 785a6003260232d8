//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, the upstream market-data API is reached
//! only through `PairFeed`. The DexScreener adapter implements it for
//! production; `mocks` holds in-memory feeds for tests and offline runs.

pub mod pair_feed;
pub mod mocks;

pub use pair_feed::{FeedError, PairFeed};
pub use mocks::{FailingFeed, StaticFeed};
