//! Domain Layer - Listing ingestion and normalization
//!
//! Pure types and functions with no I/O. Randomness and "now" are always
//! passed in, so every fallback is reproducible under a seeded generator.
//!
//! - `numeric`: safe coercion of untrusted numeric fields
//! - `listing`: optional-field schema of a raw DexScreener pair
//! - `token`: the canonical token record and batch types
//! - `extractors`: market cap / volume / liquidity fallback chains
//! - `relevance`: Mayhem cohort classifier
//! - `normalizer`: raw listing -> canonical token
//! - `mock`: synthetic fallback batch
//! - `view_filter`: dashboard-side filtering and ordering

pub mod numeric;
pub mod listing;
pub mod token;
pub mod extractors;
pub mod relevance;
pub mod normalizer;
pub mod mock;
pub mod view_filter;

pub use numeric::{parse_number, positive_number, to_number};
pub use listing::RawListing;
pub use token::{AiIndicators, CanonicalToken, FeedSource, IndicatorLevel, TokenBatch};
pub use extractors::{
    derive_native_volume, extract_liquidity, extract_market_cap, extract_volume, ranking_volume,
    PriceContext,
};
pub use relevance::{RelevanceClassifier, DEFAULT_COHORT_KEYWORD};
pub use normalizer::{NormalizerConfig, PairNormalizer};
pub use mock::{generate_mock_tokens, generate_mock_tokens_with, DEFAULT_MOCK_COUNT};
pub use view_filter::{sort_by_created_desc, Timeframe, TokenFilter};
