//! Canonical Token Record
//!
//! The single output entity of the ingestion pipeline. Records are rebuilt
//! from scratch on every poll and never mutated after they are returned.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the synthetic AI score
pub const AI_SCORE_MIN: u8 = 60;
/// Upper bound of the synthetic AI score
pub const AI_SCORE_MAX: u8 = 95;

/// Illustrative signal label shown next to each token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorLevel {
    High,
    Elevated,
    Neutral,
    Cooling,
    Watch,
}

impl IndicatorLevel {
    pub const ALL: [IndicatorLevel; 5] = [
        IndicatorLevel::High,
        IndicatorLevel::Elevated,
        IndicatorLevel::Neutral,
        IndicatorLevel::Cooling,
        IndicatorLevel::Watch,
    ];

    /// Uniformly pick one of the five labels
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorLevel::High => "High",
            IndicatorLevel::Elevated => "Elevated",
            IndicatorLevel::Neutral => "Neutral",
            IndicatorLevel::Cooling => "Cooling",
            IndicatorLevel::Watch => "Watch",
        }
    }
}

impl fmt::Display for IndicatorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthetic indicator set. Not derived from market data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiIndicators {
    pub breakout_potential: IndicatorLevel,
    pub liquidity_health: IndicatorLevel,
    pub community_hype: IndicatorLevel,
}

impl AiIndicators {
    /// Three independent uniform draws
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            breakout_potential: IndicatorLevel::random(rng),
            liquidity_health: IndicatorLevel::random(rng),
            community_hype: IndicatorLevel::random(rng),
        }
    }
}

/// Draw an AI score uniformly in `[AI_SCORE_MIN, AI_SCORE_MAX]`
pub fn random_ai_score<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(AI_SCORE_MIN..=AI_SCORE_MAX)
}

/// Random UUID v4 drawn from the injected generator
pub fn random_token_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .to_string()
}

/// Normalized token record consumed by the dashboard layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalToken {
    /// Pair address, or a generated UUID when the listing has none
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    /// Market cap in USD, always > 0
    pub market_cap: f64,
    /// Volume in native units (SOL)
    pub volume: f64,
    /// Liquidity in native units (SOL)
    pub liquidity: f64,
    pub holders: u64,
    pub ai_score: u8,
    pub ai_indicators: AiIndicators,
    pub image: String,
    pub website: String,
    pub twitter: String,
    pub telegram: String,
    pub dex_url: String,
    pub pumpfun_url: String,
    pub description: String,
    /// True iff the record came from the fallback generator
    pub is_mock: bool,
}

impl CanonicalToken {
    /// Age of the token relative to `now`, in whole minutes
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_minutes()
    }
}

/// Where a batch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Live,
    Mock,
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Live => f.write_str("live"),
            FeedSource::Mock => f.write_str("mock"),
        }
    }
}

/// Result of one aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBatch {
    pub tokens: Vec<CanonicalToken>,
    pub source: FeedSource,
    /// False when no listing matched the cohort keyword and the unfiltered
    /// set was shown instead. Always false for mock batches.
    pub cohort_filtered: bool,
}

impl TokenBatch {
    pub fn live(tokens: Vec<CanonicalToken>, cohort_filtered: bool) -> Self {
        Self {
            tokens,
            source: FeedSource::Live,
            cohort_filtered,
        }
    }

    pub fn mock(tokens: Vec<CanonicalToken>) -> Self {
        Self {
            tokens,
            source: FeedSource::Mock,
            cohort_filtered: false,
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == FeedSource::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ai_score_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            let score = random_ai_score(&mut rng);
            assert!((AI_SCORE_MIN..=AI_SCORE_MAX).contains(&score));
        }
    }

    #[test]
    fn test_indicator_levels_cover_all_labels() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(IndicatorLevel::random(&mut rng));
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_random_token_id_is_uuid_v4() {
        let re = regex::Regex::new(
            r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let a = random_token_id(&mut rng);
        let b = random_token_id(&mut rng);
        assert!(re.is_match(&a), "{a}");
        assert_ne!(a, b);
        assert_eq!(random_token_id(&mut StdRng::seed_from_u64(11)), a);
    }

    #[test]
    fn test_feed_source_serialization() {
        assert_eq!(serde_json::to_string(&FeedSource::Live).unwrap(), "\"live\"");
        assert_eq!(serde_json::to_string(&FeedSource::Mock).unwrap(), "\"mock\"");
        assert_eq!(FeedSource::Mock.to_string(), "mock");
    }

    #[test]
    fn test_indicators_serialize_camel_case() {
        let indicators = AiIndicators {
            breakout_potential: IndicatorLevel::High,
            liquidity_health: IndicatorLevel::Cooling,
            community_hype: IndicatorLevel::Watch,
        };
        let json = serde_json::to_value(&indicators).unwrap();
        assert_eq!(json["breakoutPotential"], "High");
        assert_eq!(json["liquidityHealth"], "Cooling");
        assert_eq!(json["communityHype"], "Watch");
    }

    #[test]
    fn test_batch_constructors() {
        let live = TokenBatch::live(Vec::new(), true);
        assert!(live.is_live());
        assert!(live.cohort_filtered);

        let mock = TokenBatch::mock(Vec::new());
        assert_eq!(mock.source, FeedSource::Mock);
        assert!(!mock.cohort_filtered);
    }
}
