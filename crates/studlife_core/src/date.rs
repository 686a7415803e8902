//! Date normalizer for the two textual calendar-date encodings.
//!
//! # Responsibility
//! - Parse `DD.MM.YYYY` and `YYYY-MM-DD` (plus a few generic layouts) into a
//!   single [`CalendarDate`] value.
//! - Re-encode accepted input into the canonical `DD.MM.YYYY` form.
//! - Provide total ordering keys that never fail.
//!
//! # Invariants
//! - Parsing never panics; unparsable input orders as the Unix epoch date.
//! - Normalization of unparsable input returns the trimmed raw text so it can
//!   still be displayed.
//! - Textual encodings exist only at the serialization boundary.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Unambiguous calendar date used by all comparisons in core.
pub type CalendarDate = NaiveDate;

/// Canonical persisted form, `DD.MM.YYYY`.
pub const CANONICAL_FORMAT: &str = "%d.%m.%Y";
/// Legacy ISO form, `YYYY-MM-DD`.
pub const ISO_FORMAT: &str = "%Y-%m-%d";

static DOTTED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{1,4})$").expect("valid dotted date regex")
});
static DASHED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})-(\d{1,2})-(\d{1,2})$").expect("valid dashed date regex")
});

const GENERIC_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%d/%m/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
const GENERIC_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Parses a calendar date from any accepted textual encoding.
///
/// Returns `None` for empty or unparsable input, including out-of-range
/// components such as `31.02.2025`.
pub fn parse_date(value: &str) -> Option<CalendarDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = DOTTED_DATE_RE.captures(trimmed) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }
    if let Some(caps) = DASHED_DATE_RE.captures(trimmed) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    parse_generic(trimmed)
}

/// Returns an ordering key for `value`; unparsable input sorts first.
pub fn sort_key(value: &str) -> CalendarDate {
    parse_date(value).unwrap_or_else(epoch_date)
}

/// Re-encodes `value` into the canonical zero-padded `DD.MM.YYYY` form.
///
/// Input that cannot be parsed is returned trimmed but otherwise unchanged.
pub fn normalize_to_canonical(value: &str) -> String {
    match parse_date(value) {
        Some(date) => to_canonical(date),
        None => value.trim().to_string(),
    }
}

/// Formats a date in canonical `DD.MM.YYYY` form.
pub fn to_canonical(date: CalendarDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Formats a date in ISO `YYYY-MM-DD` form.
pub fn to_iso(date: CalendarDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Earliest ordering position used for broken records (1970-01-01).
pub fn epoch_date() -> CalendarDate {
    NaiveDate::default()
}

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn calendar_days_between(from: CalendarDate, to: CalendarDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

fn ymd(year: &str, month: &str, day: &str) -> Option<CalendarDate> {
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    let day = day.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_generic(value: &str) -> Option<CalendarDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    for format in GENERIC_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    GENERIC_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}
