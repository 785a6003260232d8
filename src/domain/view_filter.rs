//! Dashboard Filters
//!
//! The view-side filtering applied to a batch before display: creation
//! window, minimum volume, minimum AI score and a name/symbol search.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::token::{CanonicalToken, AI_SCORE_MIN};

/// Creation-time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
}

impl Timeframe {
    pub fn hours(&self) -> i64 {
        match self {
            Timeframe::OneHour => 1,
            Timeframe::SixHours => 6,
            Timeframe::OneDay => 24,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.hours())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1h" => Ok(Timeframe::OneHour),
            "6h" => Ok(Timeframe::SixHours),
            "24h" => Ok(Timeframe::OneDay),
            other => Err(format!("unknown timeframe '{}', expected 1h, 6h or 24h", other)),
        }
    }
}

/// Filter settings for one dashboard view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenFilter {
    pub timeframe: Timeframe,
    pub min_volume: f64,
    pub min_score: u8,
    pub search: String,
}

impl Default for TokenFilter {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::default(),
            min_volume: 0.0,
            min_score: AI_SCORE_MIN,
            search: String::new(),
        }
    }
}

impl TokenFilter {
    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_min_volume(mut self, min_volume: f64) -> Self {
        self.min_volume = min_volume;
        self
    }

    pub fn with_min_score(mut self, min_score: u8) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn matches(&self, token: &CanonicalToken, now: DateTime<Utc>) -> bool {
        let cutoff = now - Duration::hours(self.timeframe.hours());
        if token.created_at <= cutoff {
            return false;
        }
        if token.volume < self.min_volume || token.ai_score < self.min_score {
            return false;
        }

        let term = self.search.trim().to_lowercase();
        term.is_empty()
            || token.name.to_lowercase().contains(&term)
            || token.symbol.to_lowercase().contains(&term)
    }

    /// Tokens passing the filter, order preserved
    pub fn apply<'a>(
        &self,
        tokens: &'a [CanonicalToken],
        now: DateTime<Utc>,
    ) -> Vec<&'a CanonicalToken> {
        tokens.iter().filter(|t| self.matches(t, now)).collect()
    }
}

/// Newest first
pub fn sort_by_created_desc(tokens: &mut [CanonicalToken]) {
    tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
