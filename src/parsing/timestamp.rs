//! Timestamp coercion shared by both import paths.
//!
//! Precedence is fixed: a number is a Unix epoch in seconds (fractions
//! allowed), a non-empty string is passed through untouched, and anything
//! else falls back to the ingestion time.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Formats a UTC datetime the way every stored timestamp is written.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// The current ingestion time.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Converts fractional epoch seconds into an ISO-8601 UTC string.
///
/// Returns `None` for non-finite or out-of-range values.
pub fn epoch_to_timestamp(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos).map(format_timestamp)
}

/// Coerces an optional JSON value into a timestamp, without a default.
///
/// # Example
///
/// ```
/// use chatvault::parsing::coerce_timestamp;
/// use serde_json::json;
///
/// assert_eq!(coerce_timestamp(Some(&json!(0))).as_deref(), Some("1970-01-01T00:00:00Z"));
/// assert_eq!(coerce_timestamp(Some(&json!("yesterday"))).as_deref(), Some("yesterday"));
/// assert_eq!(coerce_timestamp(Some(&json!(null))), None);
/// ```
pub fn coerce_timestamp(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => n.as_f64().and_then(epoch_to_timestamp),
        Value::String(s) => string_timestamp(s),
        _ => None,
    }
}

/// Like [`coerce_timestamp`], defaulting to the ingestion time.
pub fn timestamp_or_now(value: Option<&Value>) -> String {
    coerce_timestamp(value).unwrap_or_else(now_timestamp)
}

/// Passes through a non-empty string. Used where epochs are not accepted.
pub fn string_timestamp(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
