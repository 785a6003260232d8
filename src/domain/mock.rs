//! Fallback Token Generator
//!
//! Synthetic batch used when no live data is available, and as the
//! immediate no-network starting state of the poller.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::extractors::{
    random_count, random_in_range, HOLDERS_FALLBACK, LIQUIDITY_FALLBACK, MARKET_CAP_FALLBACK,
    VOLUME_FALLBACK,
};
use super::token::{random_ai_score, random_token_id, AiIndicators, CanonicalToken};

/// Default size of a synthetic batch
pub const DEFAULT_MOCK_COUNT: usize = 24;
/// Synthetic tokens are created within this many minutes of now
pub const MOCK_MAX_AGE_MINUTES: i64 = 360;

pub const MOCK_DESCRIPTION: &str = "Simulated Mayhem Mode token. Connect real DexScreener pump.fun \
                                    feed to replace this data with live intel.";

/// Generate `count` synthetic tokens from the given generator
pub fn generate_mock_tokens_with<R: Rng + ?Sized>(
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<CanonicalToken> {
    (0..count).map(|_| mock_token(now, rng)).collect()
}

/// Generate `count` synthetic tokens with a fresh entropy-seeded generator
pub fn generate_mock_tokens(count: usize) -> Vec<CanonicalToken> {
    let mut rng = StdRng::from_entropy();
    generate_mock_tokens_with(count, Utc::now(), &mut rng)
}

fn mock_token<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> CanonicalToken {
    let name = format!("Mayhem Agent #{}", rng.gen_range(1000..=9999));
    let symbol = format!("MHM{}", rng.gen_range(10..=99));
    let created_at = now - Duration::minutes(rng.gen_range(1..=MOCK_MAX_AGE_MINUTES));

    CanonicalToken {
        id: random_token_id(rng),
        name,
        symbol,
        created_at,
        market_cap: random_in_range(rng, MARKET_CAP_FALLBACK),
        volume: random_in_range(rng, VOLUME_FALLBACK),
        liquidity: random_in_range(rng, LIQUIDITY_FALLBACK),
        holders: random_count(rng, HOLDERS_FALLBACK),
        ai_score: random_ai_score(rng),
        ai_indicators: AiIndicators::random(rng),
        image: String::new(),
        website: String::new(),
        twitter: String::new(),
        telegram: String::new(),
        dex_url: String::new(),
        pumpfun_url: String::new(),
        description: MOCK_DESCRIPTION.to_string(),
        is_mock: true,
    }
}
