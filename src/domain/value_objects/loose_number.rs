//! Loose numeric decoding for wire payloads.
//!
//! Money and size fields sometimes arrive as strings with thousands
//! separators ("4,300.25") instead of JSON numbers. This module is the one
//! place that decodes them: strip separators, parse, `None` on failure.
//! A field that cannot be parsed becomes `None`, never NaN, so callers can
//! treat it as "unknown" rather than zero.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a string-encoded number, tolerating thousands separators.
pub fn parse(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Deserialize an `Option<f64>` from a number, a string, or null.
///
/// Anything unparsable (including sentinels like "All") decodes to `None`.
pub fn option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse(&s),
        _ => None,
    }))
}
