//! Mayhem Radar - pump.fun Mayhem Mode Token Ingestion Library
//!
//! Pulls Solana pump.fun pairs from DexScreener, narrows them to the Mayhem
//! Mode cohort and normalizes each into a canonical token record. Falls back
//! to a simulated batch whenever live data is unavailable.
//!
//! # Modules
//!
//! - `domain`: Listing schema, extractors, classifier, normalizer, mock generator
//! - `ports`: Trait abstractions (PairFeed)
//! - `adapters`: External implementations (DexScreener, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Source aggregator and poller

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;

pub use application::{TokenAggregator, TokenPoller};
pub use domain::{generate_mock_tokens, CanonicalToken, FeedSource, TokenBatch};
