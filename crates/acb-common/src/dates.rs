//! Date parsing for input cells.
//!
//! All parsers are lenient about surrounding whitespace and return `None`
//! rather than an error: an unusable date is a value-level problem.

use chrono::NaiveDate;

/// The date format used by every input table except the raw prescription log.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, accepting a trailing time component.
///
/// ```
/// use acb_common::parse_iso_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2015, 6, 1);
/// assert_eq!(parse_iso_date("2015-06-01"), expected);
/// assert_eq!(parse_iso_date("2015-06-01 00:00:00"), expected);
/// assert_eq!(parse_iso_date("2015-13-01"), None);
/// ```
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = match trimmed.get(10..11) {
        Some(" " | "T") => &trimmed[..10],
        _ => trimmed,
    };
    parse_date(date_part, ISO_DATE_FORMAT)
}

/// Parse a date cell with an explicit `chrono` format string.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, format).ok()
}

/// Render a date the way output tables carry it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}
