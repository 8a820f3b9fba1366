//! Permissive date coercion for schedule cells
//!
//! Accepted inputs:
//! - cells the source already typed as dates
//! - numeric cells, read as spreadsheet serial day numbers (epoch 1899-12-30)
//! - ISO dates and datetimes (`2025-01-31`, `2025/01/31`, `2025-01-31T08:00:00`)
//! - day/month/year forms with `/`, `-` or `.` separators, resolved by [`DateOrder`]
//!   when both leading parts are ≤ 12
//! - compact `YYYYMMDD`
//! - month names (`Jan 5, 2025`, `5 January 2025`, `05-Jan-2025`)
//!
//! Anything else yields `None`, as do dates outside the years 1 to 9999;
//! the caller decides what a missing date means.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use sheetline_core::{Cell, DateOrder};

/// Largest serial a spreadsheet can represent (9999-12-31)
const MAX_SERIAL: f64 = 2_958_465.0;

const MAX_YEAR: i32 = 9999;

// `%B` also accepts abbreviated names when parsing
const MONTH_NAME_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%d-%B-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Day zero of the spreadsheet serial date system.
///
/// A blank date cell stored as serial `0` lands here, which is why rows
/// dated at or before 1900 are treated as carrying no date.
pub fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Convert a serial day number to a date, ignoring any time fraction
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_SERIAL {
        return None;
    }
    let days = serial.floor() as i64;
    serial_epoch().checked_add_signed(chrono::Duration::days(days))
}

/// Coerce a cell to a calendar date
pub fn parse_date_cell(cell: &Cell, order: DateOrder) -> Option<NaiveDate> {
    let date = match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(n) => serial_to_date(*n),
        Cell::Text(s) => parse_date_str(s, order),
        Cell::Empty | Cell::Bool(_) => None,
    }?;
    (1..=MAX_YEAR).contains(&date.year()).then_some(date)
}

/// Parse a textual date
pub fn parse_date_str(input: &str, order: DateOrder) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_iso(s) {
        return Some(date);
    }

    // Drop a trailing time of day from `dd/mm/yyyy hh:mm` style values
    let date_part = match s.split_once(char::is_whitespace) {
        Some((head, tail)) if tail.contains(':') => head,
        _ => s,
    };

    if date_part.len() == 8 && date_part.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(date_part, "%Y%m%d").ok();
    }

    if let Some(date) = parse_numeric(date_part, order) {
        return Some(date);
    }

    MONTH_NAME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// `a/b/yyyy` with `/`, `-` or `.`; the year may also lead (`yyyy/m/d`)
fn parse_numeric(s: &str, order: DateOrder) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(['/', '-', '.']).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    if !parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    if parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if parts[2].len() != 4 {
        return None;
    }
    let year: i32 = parts[2].parse().ok()?;
    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;

    let (month, day) = if a > 12 && b <= 12 {
        (b, a)
    } else if b > 12 && a <= 12 {
        (a, b)
    } else {
        match order {
            DateOrder::Dmy => (b, a),
            DateOrder::Mdy | DateOrder::Ymd => (a, b),
        }
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// True when the date is a blank-cell artifact rather than a real date
pub fn is_sentinel(date: NaiveDate, sentinel_year: i32) -> bool {
    date.year() <= sentinel_year
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_dates() {
        assert_eq!(parse_date_str("2025-01-15", DateOrder::Mdy), Some(date(2025, 1, 15)));
        assert_eq!(parse_date_str("2025/01/15", DateOrder::Mdy), Some(date(2025, 1, 15)));
        assert_eq!(parse_date_str(" 2025-1-5 ", DateOrder::Mdy), Some(date(2025, 1, 5)));
    }

    #[test]
    fn iso_datetimes_keep_the_date() {
        assert_eq!(
            parse_date_str("2025-01-15 00:00:00", DateOrder::Mdy),
            Some(date(2025, 1, 15))
        );
        assert_eq!(
            parse_date_str("2025-01-15T17:30:00", DateOrder::Mdy),
            Some(date(2025, 1, 15))
        );
        assert_eq!(
            parse_date_str("2025-01-15T17:30:00+07:00", DateOrder::Mdy),
            Some(date(2025, 1, 15))
        );
    }

    #[test]
    fn ambiguous_numeric_dates_follow_order() {
        assert_eq!(parse_date_str("01/02/2025", DateOrder::Mdy), Some(date(2025, 1, 2)));
        assert_eq!(parse_date_str("01/02/2025", DateOrder::Dmy), Some(date(2025, 2, 1)));
    }

    #[test]
    fn unambiguous_numeric_dates_ignore_order() {
        assert_eq!(parse_date_str("31/12/2025", DateOrder::Mdy), Some(date(2025, 12, 31)));
        assert_eq!(parse_date_str("12/31/2025", DateOrder::Dmy), Some(date(2025, 12, 31)));
        assert_eq!(parse_date_str("15.03.2025", DateOrder::Mdy), Some(date(2025, 3, 15)));
    }

    #[test]
    fn numeric_date_with_time() {
        assert_eq!(
            parse_date_str("15/03/2025 08:00", DateOrder::Dmy),
            Some(date(2025, 3, 15))
        );
    }

    #[test]
    fn compact_dates() {
        assert_eq!(parse_date_str("20250315", DateOrder::Mdy), Some(date(2025, 3, 15)));
    }

    #[test]
    fn month_names() {
        assert_eq!(parse_date_str("Jan 5, 2025", DateOrder::Mdy), Some(date(2025, 1, 5)));
        assert_eq!(parse_date_str("5 January 2025", DateOrder::Mdy), Some(date(2025, 1, 5)));
        assert_eq!(parse_date_str("05-Jan-2025", DateOrder::Mdy), Some(date(2025, 1, 5)));
    }

    #[test]
    fn garbage_is_none() {
        for input in ["", "   ", "TBD", "next week", "13/13/2025", "2025-02-30", "12345"] {
            assert_eq!(parse_date_str(input, DateOrder::Mdy), None, "input: {input:?}");
        }
    }

    #[test]
    fn serial_numbers() {
        assert_eq!(serial_to_date(0.0), Some(date(1899, 12, 30)));
        assert_eq!(serial_to_date(45658.0), Some(date(2025, 1, 1)));
        assert_eq!(serial_to_date(45658.75), Some(date(2025, 1, 1)));
        assert_eq!(serial_to_date(-1.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn cells() {
        let order = DateOrder::Mdy;
        assert_eq!(parse_date_cell(&Cell::Date(date(2025, 2, 3)), order), Some(date(2025, 2, 3)));
        assert_eq!(parse_date_cell(&Cell::Number(45658.0), order), Some(date(2025, 1, 1)));
        assert_eq!(parse_date_cell(&Cell::text("2025-02-03"), order), Some(date(2025, 2, 3)));
        assert_eq!(parse_date_cell(&Cell::Empty, order), None);
        assert_eq!(parse_date_cell(&Cell::Bool(true), order), None);
    }

    #[test]
    fn years_beyond_spreadsheet_range_are_rejected() {
        let order = DateOrder::Mdy;
        assert_eq!(parse_date_cell(&Cell::text("+262142-12-31"), order), None);
        assert_eq!(parse_date_cell(&Cell::text("Dec 31, +262142"), order), None);
        assert_eq!(parse_date_cell(&Cell::text("+10000-01-01"), order), None);
        assert_eq!(parse_date_cell(&Cell::Date(NaiveDate::MAX), order), None);
        assert_eq!(parse_date_cell(&Cell::text("9999-12-31"), order), Some(date(9999, 12, 31)));
    }

    #[test]
    fn sentinel_threshold_is_inclusive() {
        assert!(is_sentinel(date(1899, 12, 30), 1900));
        assert!(is_sentinel(date(1900, 1, 1), 1900));
        assert!(!is_sentinel(date(1901, 1, 1), 1900));
        assert!(!is_sentinel(date(2024, 1, 1), 1900));
    }
}
