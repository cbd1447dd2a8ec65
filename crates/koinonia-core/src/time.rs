//! Timestamp helpers.
//!
//! The database stores timestamps as SQLite's `datetime('now')` text
//! (`YYYY-MM-DD HH:MM:SS`, UTC) and dates as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a stored `datetime('now')` timestamp as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Format a date the way the database stores it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2026-08-25 10:30:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-08-25T10:30:00+00:00");
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-08-25").is_some());
        assert!(parse_date("08/25/2026").is_none());
    }
}
