//! Field Extractors
//!
//! Each extractor walks an ordered list of named sources on a [`RawListing`]
//! and converts the first usable one into the canonical unit. When nothing
//! usable exists it draws a plausible value from the injected generator so
//! the dashboard never shows zeros for freshly listed pairs.
//!
//! | Field      | Chain                                                        |
//! |------------|--------------------------------------------------------------|
//! | market cap | `marketCap` > `fdv` > random [50k, 5M]                       |
//! | volume     | USD `h6`/`h24`/`m5` converted > native `h6`/`h24` > random [20, 400] |
//! | liquidity  | quote side if quote is native > `native` > USD converted > random [15, 180] |

use std::ops::RangeInclusive;

use rand::Rng;
use serde_json::Value;

use super::listing::RawListing;
use super::numeric::positive_number;

/// Fallback market cap range in USD
pub const MARKET_CAP_FALLBACK: RangeInclusive<u64> = 50_000..=5_000_000;
/// Fallback volume range in native units
pub const VOLUME_FALLBACK: RangeInclusive<u64> = 20..=400;
/// Fallback liquidity range in native units
pub const LIQUIDITY_FALLBACK: RangeInclusive<u64> = 15..=180;
/// Fallback holder count range
pub const HOLDERS_FALLBACK: RangeInclusive<u64> = 20..=220;

/// Native price floor used when converting volume with no native price
const NATIVE_PRICE_FLOOR: f64 = 0.0001;

/// Uniform integer draw from an inclusive range, as f64
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<u64>) -> f64 {
    rng.gen_range(range) as f64
}

/// Uniform integer draw from an inclusive range, for count fields
pub fn random_count<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<u64>) -> u64 {
    rng.gen_range(range)
}

/// Prices derived once per listing and shared by the unit conversions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceContext {
    /// Token price in native units
    pub price_native: f64,
    /// Token price in USD
    pub price_usd: f64,
    /// Configured USD price of one native unit, used when the implied one is unknown
    pub native_usd_price: f64,
}

impl PriceContext {
    fn has_both_prices(&self) -> bool {
        self.price_native > 0.0 && self.price_usd > 0.0
    }

    /// USD price of one native unit implied by the pair's two prices
    pub fn implied_native_usd_price(&self) -> Option<f64> {
        self.has_both_prices()
            .then(|| self.price_usd / self.price_native)
    }
}

fn first_positive<'a>(sources: impl IntoIterator<Item = Option<&'a Value>>) -> Option<f64> {
    sources.into_iter().find_map(positive_number)
}

/// Market cap in USD. Always > 0.
pub fn extract_market_cap<R: Rng + ?Sized>(listing: &RawListing, rng: &mut R) -> f64 {
    positive_number(listing.market_cap.as_ref())
        .or_else(|| positive_number(listing.fdv.as_ref()))
        .unwrap_or_else(|| random_in_range(rng, MARKET_CAP_FALLBACK))
}

/// Convert a USD volume into native units.
///
/// A zero USD price is replaced by 1 and a zero native price by a small
/// floor, so the result is always finite even for degenerate prices.
pub fn derive_native_volume(volume_usd: f64, price_usd: f64, price_native: f64) -> f64 {
    let safe_price_usd = if price_usd > 0.0 { price_usd } else { 1.0 };
    let safe_price_native = if price_native > 0.0 {
        price_native
    } else {
        NATIVE_PRICE_FLOOR
    };
    (volume_usd / safe_price_usd) * safe_price_native
}

/// Volume in native units. Always >= 0.
pub fn extract_volume<R: Rng + ?Sized>(
    listing: &RawListing,
    prices: &PriceContext,
    rng: &mut R,
) -> f64 {
    let volume = listing.volume.as_ref();

    let volume_usd = first_positive([
        volume.and_then(|v| v.h6.as_ref()),
        volume.and_then(|v| v.h24.as_ref()),
        volume.and_then(|v| v.m5.as_ref()),
    ]);
    if let Some(volume_usd) = volume_usd {
        return if prices.has_both_prices() {
            derive_native_volume(volume_usd, prices.price_usd, prices.price_native)
        } else {
            volume_usd / prices.native_usd_price
        };
    }

    let volume_native = first_positive([
        volume.and_then(|v| v.h6.as_ref()),
        volume.and_then(|v| v.h24.as_ref()),
    ]);
    if let Some(volume_native) = volume_native {
        return volume_native;
    }

    random_in_range(rng, VOLUME_FALLBACK)
}

/// Liquidity in native units. Always >= 0.
pub fn extract_liquidity<R: Rng + ?Sized>(
    listing: &RawListing,
    prices: &PriceContext,
    native_aliases: &[String],
    rng: &mut R,
) -> f64 {
    let liquidity = listing.liquidity.as_ref();

    let quote_is_native = listing
        .quote_symbol()
        .map(|symbol| native_aliases.iter().any(|alias| alias.eq_ignore_ascii_case(symbol)))
        .unwrap_or(false);

    if quote_is_native {
        if let Some(quote) = positive_number(liquidity.and_then(|l| l.quote.as_ref())) {
            return quote;
        }
    }

    if let Some(native) = positive_number(liquidity.and_then(|l| l.native.as_ref())) {
        return native;
    }

    if let Some(usd) = positive_number(liquidity.and_then(|l| l.usd.as_ref())) {
        return match prices.implied_native_usd_price() {
            Some(native_usd) => usd / native_usd,
            None => usd / prices.native_usd_price,
        };
    }

    random_in_range(rng, LIQUIDITY_FALLBACK)
}

/// Volume signal used to rank listings: first positive of `h6`, `h24`,
/// `h24Usd`, else 0.
pub fn ranking_volume(listing: &RawListing) -> f64 {
    let volume = listing.volume.as_ref();
    first_positive([
        volume.and_then(|v| v.h6.as_ref()),
        volume.and_then(|v| v.h24.as_ref()),
        volume.and_then(|v| v.h24_usd.as_ref()),
    ])
    .unwrap_or(0.0)
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

    fn aliases() -> Vec<String> {
        vec!["SOL".to_string(), "WSOL".to_string(), "ANSOL".to_string()]
    }

    fn prices(price_native: f64, price_usd: f64) -> PriceContext {
        PriceContext {
            price_native,
            price_usd,
            native_usd_price: 150.0,
        }
    }

    #[test]
    fn test_market_cap_prefers_source_value() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({"marketCap": "120000", "fdv": 999}));
        assert_eq!(extract_market_cap(&l, &mut rng), 120_000.0);
    }

    #[test]
    fn test_market_cap_falls_back_to_fdv() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({"marketCap": 0, "fdv": 250000}));
        assert_eq!(extract_market_cap(&l, &mut rng), 250_000.0);
    }

    #[test]
    fn test_market_cap_random_is_bounded_and_integral() {
        let mut rng = StdRng::seed_from_u64(3);
        let l = listing(json!({"marketCap": null, "fdv": "garbage"}));
        for _ in 0..200 {
            let cap = extract_market_cap(&l, &mut rng);
            assert!((50_000.0..=5_000_000.0).contains(&cap));
            assert_eq!(cap.fract(), 0.0);
        }
    }

    #[test]
    fn test_market_cap_random_is_reproducible() {
        let l = RawListing::default();
        let a = extract_market_cap(&l, &mut StdRng::seed_from_u64(42));
        let b = extract_market_cap(&l, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_volume_converts_usd_with_pair_prices() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({"volume": {"h6": 3000, "h24": 9000}}));
        // 3000 USD at $0.003/token, 0.00002 SOL/token => 20 SOL
        let v = extract_volume(&l, &prices(0.00002, 0.003), &mut rng);
        assert_relative_eq!(v, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_volume_skips_non_positive_windows() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({"volume": {"h6": 0, "h24": null, "m5": "300"}}));
        let v = extract_volume(&l, &prices(0.0, 0.0), &mut rng);
        assert_relative_eq!(v, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_volume_uses_default_price_without_pair_prices() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({"volume": {"h24": 1500}}));
        let v = extract_volume(&l, &prices(0.001, 0.0), &mut rng);
        assert_relative_eq!(v, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_volume_random_fallback() {
        let mut rng = StdRng::seed_from_u64(9);
        let l = listing(json!({"volume": {"h6": -5, "h24": "n/a"}}));
        for _ in 0..100 {
            let v = extract_volume(&l, &prices(0.001, 0.15), &mut rng);
            assert!((20.0..=400.0).contains(&v));
        }
    }

    #[test]
    fn test_derive_native_volume_zero_usd_price_quirk() {
        // Zero USD price is replaced by 1, not rejected
        assert_relative_eq!(derive_native_volume(100.0, 0.0, 0.5), 50.0);
        assert_relative_eq!(derive_native_volume(100.0, 0.0, 0.0), 0.01, epsilon = 1e-12);
        assert_relative_eq!(derive_native_volume(100.0, 2.0, 0.01), 0.5);
    }

    #[test]
    fn test_liquidity_native_quote_path() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({
            "quoteToken": {"symbol": "SOL"},
            "liquidity": {"quote": 12.5, "usd": 99999, "native": 3}
        }));
        assert_eq!(extract_liquidity(&l, &prices(0.001, 0.15), &aliases(), &mut rng), 12.5);
    }

    #[test]
    fn test_liquidity_quote_alias_is_case_insensitive() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({
            "quoteToken": {"symbol": "wsol"},
            "liquidity": {"quote": "7.25"}
        }));
        assert_eq!(extract_liquidity(&l, &prices(0.001, 0.15), &aliases(), &mut rng), 7.25);
    }

    #[test]
    fn test_liquidity_ignores_quote_for_non_native_pairs() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({
            "quoteToken": {"symbol": "USDC"},
            "liquidity": {"quote": 5000, "native": 42}
        }));
        assert_eq!(extract_liquidity(&l, &prices(0.001, 0.15), &aliases(), &mut rng), 42.0);
    }

    #[test]
    fn test_liquidity_converts_usd_with_implied_price() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({"liquidity": {"usd": 3000}}));
        // implied SOL price = 0.2 / 0.001 = 200 USD
        let liq = extract_liquidity(&l, &prices(0.001, 0.2), &aliases(), &mut rng);
        assert_relative_eq!(liq, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_liquidity_converts_usd_with_default_price() {
        let mut rng = StdRng::seed_from_u64(1);
        let l = listing(json!({"liquidity": {"usd": 3000}}));
        let liq = extract_liquidity(&l, &prices(0.0, 0.2), &aliases(), &mut rng);
        assert_relative_eq!(liq, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_liquidity_random_fallback() {
        let mut rng = StdRng::seed_from_u64(5);
        let l = RawListing::default();
        for _ in 0..100 {
            let liq = extract_liquidity(&l, &prices(0.001, 0.15), &aliases(), &mut rng);
            assert!((15.0..=180.0).contains(&liq));
        }
    }

    #[test]
    fn test_random_count_stays_integral_in_range() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let holders: u64 = random_count(&mut rng, HOLDERS_FALLBACK);
            assert!((20..=220).contains(&holders));
        }
        let a = random_count(&mut StdRng::seed_from_u64(3), HOLDERS_FALLBACK);
        let b = random_in_range(&mut StdRng::seed_from_u64(3), HOLDERS_FALLBACK);
        assert_eq!(a as f64, b);
    }

    #[test]
    fn test_ranking_volume_order() {
        assert_eq!(ranking_volume(&listing(json!({"volume": {"h6": 5, "h24": 10}}))), 5.0);
        assert_eq!(ranking_volume(&listing(json!({"volume": {"h6": 0, "h24": 10}}))), 10.0);
        assert_eq!(ranking_volume(&listing(json!({"volume": {"h24Usd": "8"}}))), 8.0);
        assert_eq!(ranking_volume(&RawListing::default()), 0.0);
    }
}
