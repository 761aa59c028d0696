use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Formats seen in device/server timestamp fields, tried in order after RFC 3339.
/// Naive forms carry no offset and are taken as UTC.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Resolves a packet timestamp from a prioritized list of candidate fields.
///
/// Returns the first candidate that parses to a valid instant, `None` when none
/// do. Never panics on malformed input.
pub fn resolve_timestamp(record: &Value, candidates: &[&str]) -> Option<DateTime<Utc>> {
    candidates
        .iter()
        .find_map(|field| record.get(field).and_then(parse_instant))
}

/// Parses a single timestamp value of unknown shape.
///
/// Numbers are epoch milliseconds. Strings are tried as RFC 3339, then the
/// known naive formats, then as an all-digit epoch-millisecond string.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_instant_text(s.trim()),
        _ => None,
    }
}

fn parse_instant_text(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(ms) = text.parse::<i64>() {
            return DateTime::from_timestamp_millis(ms);
        }
    }

    None
}
