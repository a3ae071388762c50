//! Date normalization
//!
//! Converts the wire's heterogeneous date representations (date-only string,
//! ISO datetime, epoch milliseconds) into instants in a fixed reference zone.
//! Date-only values pin to midnight in that zone, so daily buckets land on
//! the same chart position regardless of the host timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::constants::datetime::{DATE_ONLY_LENGTH, FIXED_ZONE_OFFSET_SECS};
use crate::data::payload::DateInput;

/// The fixed reference zone (Asia/Seoul, UTC+9, no DST)
pub fn fixed_zone() -> FixedOffset {
    FixedOffset::east_opt(FIXED_ZONE_OFFSET_SECS).expect("fixed zone offset is in range")
}

/// Normalize a wire date into a fixed-zone instant.
///
/// Returns `None` for unparseable input; callers drop the point rather than
/// render a garbage position.
pub fn to_fixed_zone_instant(input: &DateInput) -> Option<DateTime<FixedOffset>> {
    match input {
        DateInput::Millis(ms) => Utc
            .timestamp_millis_opt(*ms)
            .single()
            .map(|dt| dt.with_timezone(&fixed_zone())),
        DateInput::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(text: &str) -> Option<DateTime<FixedOffset>> {
    if text.len() == DATE_ONLY_LENGTH {
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return fixed_zone().from_local_datetime(&midnight).single();
        }
    }

    // Full timestamps: offsets are honored when present, naive datetimes are
    // interpreted in the fixed zone
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&fixed_zone()));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return fixed_zone().from_local_datetime(&dt).single();
        }
    }

    None
}

/// Chart x coordinate of an instant (epoch seconds, millisecond precision)
pub fn timestamp_secs(instant: &DateTime<FixedOffset>) -> f64 {
    instant.timestamp_millis() as f64 / 1000.0
}

/// `YYYY-MM-DD` label of the fixed-zone day containing a chart coordinate
pub fn format_day(x: f64) -> String {
    let secs = x.floor() as i64;
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(dt) => dt.with_timezone(&fixed_zone()).format("%Y-%m-%d").to_string(),
        None => format!("{x:.0}"),
    }
}
