// Date parsing for record date fields

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Current time in milliseconds since epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a date field into milliseconds since epoch
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` datetimes (read as UTC),
/// plain `YYYY-MM-DD` dates (UTC midnight) and raw epoch-millisecond numbers.
/// Anything else is `None`.
pub fn parse_date_ms(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}
