//! # Date Parsing
//!
//! Lenient parsing of the date shapes the forms and sheets produce, and
//! normalization to `YYYY-MM-DD`.
//!
//! ## Accepted Shapes
//! ```text
//! 2024-01-15                   plain date (the canonical form)
//! 2024-01-15T10:30:00Z         RFC 3339; the instant's date on the local clock
//! 2024-01-15T10:30:00          naive timestamp
//! 2024-01-15 10:30:00          naive timestamp, space separated
//! 01/15/2024                   US month/day/year, as sheets export it
//! ```

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Canonical output format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_SHAPES: &[&str] = &[DATE_FORMAT, "%m/%d/%Y"];
const DATETIME_SHAPES: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a date-like string. Returns `None` for anything unrecognized.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = DATE_SHAPES
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local).date_naive());
    }

    DATETIME_SHAPES
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_shapes() {
        assert_eq!(parse_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date(" 2024-01-15 "), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T08:00:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 08:00:00.250"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_offset_timestamps_read_on_local_clock() {
        let west = parse_date("2024-01-15T23:00:00-12:00");
        let utc = parse_date("2024-01-16T11:00:00Z");
        let east = parse_date("2024-01-17T01:00:00+14:00");

        assert!(west.is_some());
        assert_eq!(west, utc);
        assert_eq!(utc, east);

        let expected = DateTime::parse_from_rfc3339("2024-01-16T11:00:00Z")
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(utc, Some(expected));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(ymd(2024, 3, 5)), "2024-03-05");
    }
}
