//! Time and timestamp utilities

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Format used for record timestamps, e.g. `2023/06/15 16:22:08.031`.
///
/// Zero-padded fields keep `date` keys sortable as plain strings.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Convert hours to milliseconds
pub fn hour_to_ms(hours: u64) -> i64 {
    (hours as i64).saturating_mul(3_600_000)
}

/// Current local time formatted as a record timestamp
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Format a local time as a record timestamp
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a record timestamp back into local time.
///
/// Accepts the record format with or without fractional seconds, plus
/// RFC 3339 strings. Returns `None` for anything else (e.g. numeric keys).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local));
    }

    ["%Y/%m/%d %H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Milliseconds elapsed between `then` and now (negative if `then` is in the future)
pub fn elapsed_ms(then: &DateTime<Local>) -> i64 {
    Local::now().signed_duration_since(*then).num_milliseconds()
}
