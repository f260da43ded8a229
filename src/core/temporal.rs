//! ISO-8601 parsing at day granularity.
//!
//! Instants are compared as naive UTC date-times. Inputs carrying an offset
//! (`Z`, `+05:30`, ...) are shifted to UTC first; inputs without one are
//! taken as already being UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Parse an ISO-8601 date or date-time string.
///
/// Returns `None` for anything that is not a recognizable instant; callers
/// decide what an unparseable date means for them.
///
/// # Examples
///
/// ```
/// use cashflow_settlement::core::temporal::parse_instant;
///
/// let due = parse_instant("2024-03-01").unwrap();
/// let paid = parse_instant("2024-03-01T00:00:00Z").unwrap();
/// assert_eq!(due, paid);
/// assert!(parse_instant("next tuesday").is_none());
/// ```
pub fn parse_instant(input: &str) -> Option<NaiveDateTime> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole days by which `at` is strictly after `due`, or `None` if on time.
///
/// Partial days are truncated: 36 hours late is one day late.
pub fn days_late(due: NaiveDateTime, at: NaiveDateTime) -> Option<i64> {
    if at > due {
        Some((at - due).num_days())
    } else {
        None
    }
}
