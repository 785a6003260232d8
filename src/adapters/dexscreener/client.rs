//! DexScreener pair feed
//!
//! One GET per call against a DexScreener pairs or search endpoint. The body
//! is read as `{ "pairs": [...] }`; each element goes through the lenient
//! `RawListing` schema so a single odd pair never sinks the whole payload.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::domain::RawListing;
use crate::ports::{FeedError, PairFeed};

/// Pump.fun cohort listing for Solana
pub const DEFAULT_COHORT_URL: &str = "https://api.dexscreener.com/latest/dex/pairs/solana/pumpfun";
/// Keyword search for the Mayhem cohort
pub const DEFAULT_SEARCH_URL: &str =
    "https://api.dexscreener.com/latest/dex/search?q=pump.fun%20mayhem";
pub const DEFAULT_USER_AGENT: &str = concat!("mayhem-radar/", env!("CARGO_PKG_VERSION"));

/// HTTP implementation of `PairFeed`
#[derive(Debug, Clone)]
pub struct DexScreenerFeed {
    name: &'static str,
    url: String,
    http: Client,
}

impl DexScreenerFeed {
    /// Create a feed for `url` with a per-request timeout
    pub fn new(name: &'static str, url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        Self::with_user_agent(name, url, timeout, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(
        name: &'static str,
        url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(Self {
            name,
            url: url.into(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PairFeed for DexScreenerFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_pairs(&self) -> Result<Vec<RawListing>, FeedError> {
        let response = self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let pairs = parse_pairs_payload(&body)?;
        debug!(feed = self.name, pairs = pairs.len(), "DexScreener payload parsed");
        Ok(pairs)
    }
}

/// Parse a DexScreener response body.
///
/// A missing, null or non-array `pairs` yields an empty list. Elements that
/// are not JSON objects are skipped.
pub fn parse_pairs_payload(body: &str) -> Result<Vec<RawListing>, FeedError> {
    let mut root: Value =
        serde_json::from_str(body).map_err(|e| FeedError::ParseError(e.to_string()))?;

    let pairs = match root.get_mut("pairs").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(pairs.into_iter().filter_map(RawListing::from_value).collect())
}
