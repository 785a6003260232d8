//! Raw Listing Schema
//!
//! Optional-field view of one DexScreener pair object. The upstream shape is
//! loose: fields go missing, numbers arrive as strings, and the same concept
//! lives under different keys depending on the endpoint. Every field here is
//! optional and a wrong-typed value decodes as absent instead of failing the
//! whole payload. Numeric fields stay as raw JSON and go through
//! [`crate::domain::numeric`] at the point of use.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decode a field as `T`, treating any shape mismatch as "absent".
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Non-blank view of an optional string field.
pub(crate) fn text(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// One pair listing as returned by the upstream market-data API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    #[serde(default, deserialize_with = "lenient")]
    pub chain_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub dex_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub pair_address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub pair_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub pair_label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub base_token: Option<TokenRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub quote_token: Option<TokenRef>,
    #[serde(default)]
    pub price_native: Option<Value>,
    #[serde(default)]
    pub price_usd: Option<Value>,
    #[serde(default)]
    pub market_cap: Option<Value>,
    #[serde(default)]
    pub fdv: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub volume: Option<VolumeWindows>,
    #[serde(default, deserialize_with = "lenient")]
    pub liquidity: Option<LiquidityBreakdown>,
    #[serde(default, deserialize_with = "lenient")]
    pub txns: Option<TxnWindows>,
    #[serde(default)]
    pub pair_created_at: Option<Value>,
    #[serde(default)]
    pub pair_created_at_timestamp: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub flags: Option<Value>,
    #[serde(default)]
    pub flag: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub info: Option<ListingInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
}

/// Base or quote side of a pair
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRef {
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
}

/// Volume per time window (USD on DexScreener)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeWindows {
    #[serde(default)]
    pub m5: Option<Value>,
    #[serde(default)]
    pub h1: Option<Value>,
    #[serde(default)]
    pub h6: Option<Value>,
    #[serde(default)]
    pub h24: Option<Value>,
    #[serde(default, rename = "h24Usd")]
    pub h24_usd: Option<Value>,
}

/// Liquidity split by unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidityBreakdown {
    #[serde(default)]
    pub usd: Option<Value>,
    #[serde(default)]
    pub base: Option<Value>,
    #[serde(default)]
    pub quote: Option<Value>,
    #[serde(default)]
    pub native: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxnWindows {
    #[serde(default, deserialize_with = "lenient")]
    pub h24: Option<TxnCounts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxnCounts {
    #[serde(default)]
    pub buys: Option<Value>,
    #[serde(default)]
    pub sells: Option<Value>,
}

/// The `info` block: profile metadata, links and segment markers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingInfo {
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub mode: Option<Value>,
    #[serde(default)]
    pub segment: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub web_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub websites: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub socials: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub telegram: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default)]
    pub time_created_ms: Option<Value>,
    #[serde(default)]
    pub time_created: Option<Value>,
}

impl RawListing {
    /// Decode one element of a `pairs` array. Non-object elements are not
    /// listings and yield `None`; objects always decode.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Identity used for de-duplication across feeds
    pub fn dedup_key(&self) -> Option<&str> {
        text(&self.pair_address)
            .or_else(|| text(&self.pair_id))
            .or_else(|| text(&self.address))
    }

    pub fn base_name(&self) -> Option<&str> {
        self.base_token.as_ref().and_then(|t| text(&t.name))
    }

    pub fn base_symbol(&self) -> Option<&str> {
        self.base_token.as_ref().and_then(|t| text(&t.symbol))
    }

    pub fn quote_symbol(&self) -> Option<&str> {
        self.quote_token.as_ref().and_then(|t| text(&t.symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_dexscreener_pair() {
        let listing = RawListing::from_value(json!({
            "chainId": "solana",
            "dexId": "pumpfun",
            "url": "https://dexscreener.com/solana/abc",
            "pairAddress": "abc",
            "baseToken": {"address": "mint1", "name": "Mayhem Cat", "symbol": "MCAT"},
            "quoteToken": {"address": "So111", "name": "Wrapped SOL", "symbol": "SOL"},
            "priceNative": "0.0000321",
            "priceUsd": "0.004815",
            "txns": {"h24": {"buys": 120, "sells": 80}},
            "volume": {"h24": 15000.5, "h6": 4000, "m5": 12},
            "liquidity": {"usd": 9000, "base": 1000000, "quote": 30.2},
            "fdv": 48150,
            "marketCap": 48150,
            "pairCreatedAt": 1_700_000_000_000u64
        }))
        .unwrap();

        assert_eq!(listing.dedup_key(), Some("abc"));
        assert_eq!(listing.base_name(), Some("Mayhem Cat"));
        assert_eq!(listing.quote_symbol(), Some("SOL"));
        assert_eq!(
            listing.volume.as_ref().and_then(|v| v.h6.as_ref()),
            Some(&json!(4000))
        );
    }

    #[test]
    fn test_wrong_types_decode_as_absent() {
        let listing = RawListing::from_value(json!({
            "pairAddress": 12345,
            "baseToken": "not-an-object",
            "volume": [1, 2, 3],
            "info": {"websites": "https://x.io", "name": {"nested": true}, "description": "ok"}
        }))
        .unwrap();

        assert!(listing.pair_address.is_none());
        assert!(listing.base_token.is_none());
        assert!(listing.volume.is_none());
        let info = listing.info.as_ref().unwrap();
        assert!(info.websites.is_none());
        assert!(info.name.is_none());
        assert_eq!(info.description.as_deref(), Some("ok"));
    }

    #[test]
    fn test_non_objects_are_not_listings() {
        assert!(RawListing::from_value(json!(null)).is_none());
        assert!(RawListing::from_value(json!([1, 2])).is_none());
        assert!(RawListing::from_value(json!("pair")).is_none());
        assert!(RawListing::from_value(json!({})).is_some());
    }

    #[test]
    fn test_dedup_key_fallbacks() {
        let by_id = RawListing {
            pair_address: Some("  ".to_string()),
            pair_id: Some("id-1".to_string()),
            ..Default::default()
        };
        assert_eq!(by_id.dedup_key(), Some("id-1"));

        let by_address = RawListing {
            address: Some("addr".to_string()),
            ..Default::default()
        };
        assert_eq!(by_address.dedup_key(), Some("addr"));

        assert_eq!(RawListing::default().dedup_key(), None);
    }
}
