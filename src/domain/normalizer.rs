//! Pair Normalizer
//!
//! Turns one [`RawListing`] into one [`CanonicalToken`]: identity, naming,
//! creation time, prices, the three unit-converted metrics, holder count,
//! the synthetic AI signals and best-effort links.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extractors::{
    extract_liquidity, extract_market_cap, extract_volume, random_count, PriceContext,
    HOLDERS_FALLBACK,
};
use super::listing::{text, RawListing};
use super::numeric::{parse_number, positive_number, to_number};
use super::token::{random_ai_score, random_token_id, AiIndicators, CanonicalToken};

/// Default USD price of one SOL
pub const DEFAULT_NATIVE_USD_PRICE: f64 = 150.0;
/// Token price in SOL assumed when the listing has none
pub const DEFAULT_NATIVE_PRICE: f64 = 0.001;
/// Quote symbols treated as SOL
pub const DEFAULT_NATIVE_ALIASES: [&str; 3] = ["SOL", "WSOL", "ANSOL"];
/// Base URL for chart deep links
pub const DEFAULT_CHART_BASE_URL: &str = "https://dexscreener.com";

/// Spacing of synthesized creation times, per listing index
const SYNTHETIC_AGE_STEP_MINUTES: i64 = 3;
/// Maximum symbol length derived from a name
const DERIVED_SYMBOL_LEN: usize = 6;
const PUMPFUN_HOST: &str = "pump.fun";

/// Constants the normalizer needs. Passed in rather than global so tests and
/// config can substitute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub native_usd_price: f64,
    pub default_native_price: f64,
    pub native_aliases: Vec<String>,
    pub chart_base_url: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            native_usd_price: DEFAULT_NATIVE_USD_PRICE,
            default_native_price: DEFAULT_NATIVE_PRICE,
            native_aliases: DEFAULT_NATIVE_ALIASES.iter().map(|s| s.to_string()).collect(),
            chart_base_url: DEFAULT_CHART_BASE_URL.to_string(),
        }
    }
}

/// Builds canonical tokens from raw listings
#[derive(Debug, Clone, Default)]
pub struct PairNormalizer {
    config: NormalizerConfig,
}

impl PairNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize one listing. `index` is the listing's rank in the batch and
    /// drives placeholder names and synthesized creation times.
    pub fn normalize<R: Rng + ?Sized>(
        &self,
        listing: &RawListing,
        index: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> CanonicalToken {
        let id = text(&listing.pair_address)
            .or_else(|| text(&listing.pair_id))
            .map(str::to_string)
            .unwrap_or_else(|| random_token_id(rng));

        let name = listing
            .base_name()
            .or_else(|| text(&listing.pair_label))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Mayhem Agent {}", index + 1));

        let symbol = listing
            .base_symbol()
            .map(str::to_string)
            .unwrap_or_else(|| derive_symbol(&name, index));

        let created_at = listing_created_at(listing).unwrap_or_else(|| {
            now - Duration::minutes(SYNTHETIC_AGE_STEP_MINUTES * index as i64)
        });

        let prices = self.prices(listing);
        let market_cap = extract_market_cap(listing, rng);
        let volume = extract_volume(listing, &prices, rng);
        let liquidity = extract_liquidity(listing, &prices, &self.config.native_aliases, rng);
        let holders = holders_from_txns(listing)
            .unwrap_or_else(|| random_count(rng, HOLDERS_FALLBACK));

        let ai_score = random_ai_score(rng);
        let ai_indicators = AiIndicators::random(rng);

        let links = info_links(listing);
        let pumpfun_url = links
            .iter()
            .find(|url| url.contains(PUMPFUN_HOST))
            .map(|url| url.to_string())
            .unwrap_or_default();
        let website = links
            .iter()
            .find(|url| !url.contains(PUMPFUN_HOST))
            .map(|url| url.to_string())
            .unwrap_or_default();

        let info = listing.info.as_ref();
        let twitter = info
            .and_then(|i| text(&i.twitter))
            .map(str::to_string)
            .or_else(|| social_url(listing, &["twitter", "x"]))
            .unwrap_or_default();
        let telegram = info
            .and_then(|i| text(&i.telegram))
            .map(str::to_string)
            .or_else(|| social_url(listing, &["telegram"]))
            .unwrap_or_default();

        let description = info
            .and_then(|i| text(&i.description))
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "DexScreener pump.fun stream indicates heightened Mayhem Mode activity for {}.",
                    symbol
                )
            });

        CanonicalToken {
            id,
            name,
            symbol,
            created_at,
            market_cap,
            volume,
            liquidity,
            holders,
            ai_score,
            ai_indicators,
            image: image_url(listing),
            website,
            twitter,
            telegram,
            dex_url: self.dex_url(listing),
            pumpfun_url,
            description,
            is_mock: false,
        }
    }

    /// Native price from the listing (default 0.001), USD price from the
    /// listing or native price times the configured SOL price.
    pub fn prices(&self, listing: &RawListing) -> PriceContext {
        let price_native = to_number(listing.price_native.as_ref(), self.config.default_native_price);
        let price_usd = to_number(
            listing.price_usd.as_ref(),
            price_native * self.config.native_usd_price,
        );
        PriceContext {
            price_native,
            price_usd,
            native_usd_price: self.config.native_usd_price,
        }
    }

    fn dex_url(&self, listing: &RawListing) -> String {
        if let Some(url) = text(&listing.url) {
            return url.to_string();
        }
        match (text(&listing.chain_id), text(&listing.pair_address)) {
            (Some(chain), Some(pair)) => format!(
                "{}/{}/{}",
                self.config.chart_base_url.trim_end_matches('/'),
                chain,
                pair
            ),
            _ => String::new(),
        }
    }
}

/// Alphanumeric characters of `name`, first six, uppercased. Falls back to
/// `MHM{index}` when the name has none.
pub fn derive_symbol(name: &str, index: usize) -> String {
    let symbol: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(DERIVED_SYMBOL_LEN)
        .collect::<String>()
        .to_uppercase();
    if symbol.is_empty() {
        format!("MHM{}", index)
    } else {
        symbol
    }
}

/// Creation time from `pairCreatedAt`, `pairCreatedAtTimestamp`,
/// `info.timeCreatedMs` (all milliseconds) or `info.timeCreated` (seconds).
pub fn listing_created_at(listing: &RawListing) -> Option<DateTime<Utc>> {
    let info = listing.info.as_ref();
    timestamp_millis(listing.pair_created_at.as_ref())
        .or_else(|| timestamp_millis(listing.pair_created_at_timestamp.as_ref()))
        .or_else(|| timestamp_millis(info.and_then(|i| i.time_created_ms.as_ref())))
        .or_else(|| {
            positive_number(info.and_then(|i| i.time_created.as_ref()))
                .and_then(|secs| Utc.timestamp_millis_opt((secs * 1000.0) as i64).single())
        })
}

/// Epoch milliseconds as a number or numeric string, or an RFC 3339 string
fn timestamp_millis(value: Option<&Value>) -> Option<DateTime<Utc>> {
    if let Some(ms) = parse_number(value) {
        if ms <= 0.0 {
            return None;
        }
        return Utc.timestamp_millis_opt(ms as i64).single();
    }
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Buys + sells over 24h, when positive
fn holders_from_txns(listing: &RawListing) -> Option<u64> {
    let counts = listing.txns.as_ref().and_then(|t| t.h24.as_ref());
    let buys = to_number(counts.and_then(|c| c.buys.as_ref()), 0.0);
    let sells = to_number(counts.and_then(|c| c.sells.as_ref()), 0.0);
    let total = buys + sells;
    (total > 0.0).then(|| total.round() as u64)
}

/// `info.webUrl`, `info.websites[]` (strings or `{url}` objects), `info.website`
fn info_links(listing: &RawListing) -> Vec<&str> {
    let Some(info) = listing.info.as_ref() else {
        return Vec::new();
    };

    let mut links: Vec<&str> = Vec::new();
    links.extend(text(&info.web_url));
    if let Some(websites) = info.websites.as_ref() {
        for entry in websites {
            let url = match entry {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("url").and_then(Value::as_str),
                _ => None,
            };
            links.extend(url.map(str::trim).filter(|s| !s.is_empty()));
        }
    }
    links.extend(text(&info.website));
    links
}

/// URL of the first `info.socials[]` entry whose `type` is one of `kinds`
fn social_url(listing: &RawListing, kinds: &[&str]) -> Option<String> {
    let socials = listing.info.as_ref()?.socials.as_ref()?;
    socials.iter().find_map(|entry| {
        let kind = entry.get("type").and_then(Value::as_str)?;
        if !kinds.iter().any(|k| k.eq_ignore_ascii_case(kind)) {
            return None;
        }
        entry
            .get("url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn image_url(listing: &RawListing) -> String {
    let base = listing.base_token.as_ref();
    let info = listing.info.as_ref();
    base.and_then(|t| text(&t.image_url))
        .or_else(|| base.and_then(|t| text(&t.image)))
        .or_else(|| info.and_then(|i| text(&i.image_url)))
        .or_else(|| info.and_then(|i| text(&i.image)))
        .or_else(|| text(&listing.image_url))
        .or_else(|| text(&listing.image))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn listing(value: Value) -> RawListing {
        RawListing::from_value(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn normalize(value: Value, index: usize) -> CanonicalToken {
        let mut rng = StdRng::seed_from_u64(99);
        PairNormalizer::default().normalize(&listing(value), index, now(), &mut rng)
    }

    #[test]
    fn test_full_listing() {
        let token = normalize(
            json!({
                "chainId": "solana",
                "pairAddress": "PAIR1",
                "baseToken": {"name": "Mayhem Cat", "symbol": "MCAT", "imageUrl": "https://img/cat.png"},
                "quoteToken": {"symbol": "SOL"},
                "priceNative": "0.00002",
                "priceUsd": "0.003",
                "marketCap": 48000,
                "volume": {"h6": 3000},
                "liquidity": {"quote": 30.5, "usd": 9000},
                "txns": {"h24": {"buys": 120, "sells": "80"}},
                "pairCreatedAt": 1_736_935_200_000i64,
                "info": {
                    "description": "Cats in mayhem",
                    "websites": [{"label": "Website", "url": "https://mcat.io"}, "https://pump.fun/coin/MCAT"],
                    "socials": [{"type": "twitter", "url": "https://x.com/mcat"}, {"type": "telegram", "url": "https://t.me/mcat"}]
                }
            }),
            0,
        );

        assert_eq!(token.id, "PAIR1");
        assert_eq!(token.name, "Mayhem Cat");
        assert_eq!(token.symbol, "MCAT");
        assert_eq!(token.created_at, Utc.timestamp_millis_opt(1_736_935_200_000).unwrap());
        assert_eq!(token.market_cap, 48_000.0);
        assert_relative_eq!(token.volume, 20.0, epsilon = 1e-9);
        assert_eq!(token.liquidity, 30.5);
        assert_eq!(token.holders, 200);
        assert_eq!(token.image, "https://img/cat.png");
        assert_eq!(token.website, "https://mcat.io");
        assert_eq!(token.pumpfun_url, "https://pump.fun/coin/MCAT");
        assert_eq!(token.twitter, "https://x.com/mcat");
        assert_eq!(token.telegram, "https://t.me/mcat");
        assert_eq!(token.dex_url, "https://dexscreener.com/solana/PAIR1");
        assert_eq!(token.description, "Cats in mayhem");
        assert!(!token.is_mock);
    }

    #[test]
    fn test_empty_listing_gets_placeholders() {
        let token = normalize(json!({}), 4);

        assert_eq!(token.id.len(), 36);
        assert_eq!(token.name, "Mayhem Agent 5");
        assert_eq!(token.symbol, "MAYHEM");
        assert_eq!(token.created_at, now() - Duration::minutes(12));
        assert!((50_000.0..=5_000_000.0).contains(&token.market_cap));
        assert!((20.0..=400.0).contains(&token.volume));
        assert!((15.0..=180.0).contains(&token.liquidity));
        assert!((20..=220).contains(&token.holders));
        assert!((60..=95).contains(&token.ai_score));
        assert_eq!(token.image, "");
        assert_eq!(token.website, "");
        assert_eq!(token.dex_url, "");
        assert_eq!(
            token.description,
            "DexScreener pump.fun stream indicates heightened Mayhem Mode activity for MAYHEM."
        );
    }

    #[test]
    fn test_synthesized_timestamps_strictly_decrease() {
        let times: Vec<_> = (0..5).map(|i| normalize(json!({}), i).created_at).collect();
        for pair in times.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_pair_label_and_derived_symbol() {
        let token = normalize(json!({"pairLabel": "dog-wif hat!!"}), 0);
        assert_eq!(token.name, "dog-wif hat!!");
        assert_eq!(token.symbol, "DOGWIF");
    }

    #[test]
    fn test_derive_symbol() {
        assert_eq!(derive_symbol("Pepe the 2nd", 0), "PEPETH");
        assert_eq!(derive_symbol("ab", 0), "AB");
        assert_eq!(derive_symbol("!!!", 7), "MHM7");
    }

    #[test]
    fn test_created_at_representations() {
        let secs = listing(json!({"info": {"timeCreated": 1_700_000_000}}));
        assert_eq!(
            listing_created_at(&secs),
            Utc.timestamp_millis_opt(1_700_000_000_000).single()
        );

        let ms = listing(json!({"pairCreatedAtTimestamp": "1700000000000"}));
        assert_eq!(
            listing_created_at(&ms),
            Utc.timestamp_millis_opt(1_700_000_000_000).single()
        );

        let info_ms = listing(json!({"info": {"timeCreatedMs": 1_700_000_000_123i64}}));
        assert_eq!(
            listing_created_at(&info_ms),
            Utc.timestamp_millis_opt(1_700_000_000_123).single()
        );

        let iso = listing(json!({"pairCreatedAt": "2024-05-01T10:00:00Z"}));
        assert_eq!(
            listing_created_at(&iso),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single()
        );

        assert_eq!(listing_created_at(&listing(json!({"pairCreatedAt": 0}))), None);
    }

    #[test]
    fn test_prices_defaults() {
        let normalizer = PairNormalizer::default();

        let none = normalizer.prices(&RawListing::default());
        assert_eq!(none.price_native, 0.001);
        assert_relative_eq!(none.price_usd, 0.15);

        let native_only = normalizer.prices(&listing(json!({"priceNative": "0.002"})));
        assert_relative_eq!(native_only.price_usd, 0.3);

        let both = normalizer.prices(&listing(json!({"priceNative": "0.002", "priceUsd": "0.5"})));
        assert_eq!(both.price_usd, 0.5);
    }

    #[test]
    fn test_market_cap_from_fdv() {
        let token = normalize(json!({"marketCap": 0, "fdv": 250000}), 0);
        assert_eq!(token.market_cap, 250_000.0);
    }

    #[test]
    fn test_direct_url_wins_over_built_link() {
        let token = normalize(
            json!({"url": "https://dexscreener.com/solana/direct", "chainId": "solana", "pairAddress": "P"}),
            0,
        );
        assert_eq!(token.dex_url, "https://dexscreener.com/solana/direct");
    }

    #[test]
    fn test_pair_id_used_when_address_missing() {
        let token = normalize(json!({"pairId": "pid-9"}), 0);
        assert_eq!(token.id, "pid-9");
    }

    #[test]
    fn test_direct_social_fields_win() {
        let token = normalize(
            json!({"info": {
                "twitter": "@direct",
                "telegram": "t.me/direct",
                "socials": [{"type": "twitter", "url": "https://x.com/other"}],
                "webUrl": "https://first.example",
                "website": "https://last.example"
            }}),
            0,
        );
        assert_eq!(token.twitter, "@direct");
        assert_eq!(token.telegram, "t.me/direct");
        assert_eq!(token.website, "https://first.example");
        assert_eq!(token.pumpfun_url, "");
    }

    #[test]
    fn test_holders_ignore_zero_counts() {
        let token = normalize(json!({"txns": {"h24": {"buys": 0, "sells": 0}}}), 0);
        assert!((20..=220).contains(&token.holders));
    }

    #[test]
    fn test_invariants_hold_for_hostile_input() {
        let inputs = [
            json!({"marketCap": -5, "fdv": "NaN", "volume": {"h6": "Infinity"}, "liquidity": {"usd": -1}}),
            json!({"priceNative": "0", "priceUsd": "0", "volume": {"h24": 1000}}),
            json!({"priceNative": "abc", "priceUsd": {}, "liquidity": {"native": "1e999"}}),
            json!({"baseToken": {"name": "", "symbol": "  "}}),
        ];
        for (i, input) in inputs.into_iter().enumerate() {
            let token = normalize(input, i);
            assert!(token.market_cap > 0.0);
            assert!(token.volume >= 0.0 && token.volume.is_finite());
            assert!(token.liquidity >= 0.0 && token.liquidity.is_finite());
            assert!((60..=95).contains(&token.ai_score));
            assert!(!token.name.is_empty());
            assert!(!token.symbol.is_empty());
        }
    }
}
