//! ISO-8601 detection, parsing and formatting

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Full date-time with optional fraction and optional zone
///
/// Date-only strings (`2024-01-31`) are left alone; they are common in
/// record field values and carry no zone.
static ISO_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2}(\.\d{1,9})?)?(Z|[+-]\d{2}:?\d{2})?$")
        .unwrap()
});

/// Check whether a string looks like an ISO-8601 date-time
pub fn is_iso_datetime(s: &str) -> bool {
    ISO_DATETIME.is_match(s)
}

/// Parse an ISO-8601 date-time, treating zoneless values as UTC
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if !is_iso_datetime(s) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offsets without a colon (+0000)
    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

/// Format a date-time the way the API writes them (`2024-01-31T08:15:00.000Z`)
///
/// Milliseconds are always written; finer fractions are kept when present.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    let format = if dt.timestamp_subsec_nanos() % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::AutoSi
    };
    dt.to_rfc3339_opts(format, true)
}
