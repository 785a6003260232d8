//! Numeric Coercion
//!
//! Safe parsing of untrusted numeric fields. Upstream listings carry numbers
//! as JSON numbers, numeric strings, nulls, or garbage; everything funnels
//! through here so no extractor ever sees NaN or infinity.

use serde_json::Value;

/// Interpret a raw JSON value as a finite number.
///
/// Numbers pass through, strings are trimmed and parsed (an empty string is
/// zero), booleans map to 1/0. Null, arrays, objects and anything that
/// parses to a non-finite value yield `None`.
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Null => return None,
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };

    parsed.is_finite().then_some(parsed)
}

/// Numeric interpretation of `value`, or `fallback` when it is absent or not
/// finite. Total over every input shape.
pub fn to_number(value: Option<&Value>, fallback: f64) -> f64 {
    parse_number(value).unwrap_or(fallback)
}

/// Like [`parse_number`] but only keeps strictly positive values.
pub fn positive_number(value: Option<&Value>) -> Option<f64> {
    parse_number(value).filter(|n| *n > 0.0)
}
