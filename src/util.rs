// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" CSV/number/date handling so the rest
// of the code can assume clean, typed values.
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Date layouts tried in order when no explicit list is configured.
///
/// The Superstore export writes month-first dates (`11/8/2016`).
pub const DEFAULT_DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y", "%Y/%m/%d"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts scientific notation (`1.5e3`).
/// - Returns `None` for text, `inf`/`NaN`, or anything else unparseable.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date against each layout in turn. A trailing time component
/// (`2016-11-08 00:00:00`, or `11/8/2016 0:00` as Excel re-saves it) is
/// accepted and dropped.
pub fn parse_date_safe<S: AsRef<str>>(s: Option<&str>, formats: &[S]) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt.as_ref()) {
            return Some(d);
        }
    }
    for time in ["%H:%M:%S", "%H:%M"] {
        for fmt in formats {
            let with_time = format!("{} {}", fmt.as_ref(), time);
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, &with_time) {
                return Some(dt.date());
            }
        }
    }
    None
}

pub fn days_diff(start: NaiveDate, end: NaiveDate) -> i64 {
    // `NaiveDate` supports subtraction; the result is a `Duration`.
    (end - start).num_days()
}

/// First day of the month containing `d`.
pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn average(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Rounding can turn a tiny negative into "0"; don't print "-0".
    if n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Whole-dollar currency string, e.g. `$1,234` or `-$56`.
pub fn format_currency(n: f64) -> String {
    let body = format_number(n, 0);
    match body.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", body),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `9,994 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some(" 1,234.50 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("-3.8")), Some(-3.8));
        assert_eq!(parse_f64_safe(Some("1.5e3")), Some(1500.0));
        assert_eq!(parse_f64_safe(Some("2E-2")), Some(0.02));
        assert_eq!(parse_f64_safe(Some("12abc")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = DEFAULT_DATE_FORMATS;
        let expected = NaiveDate::from_ymd_opt(2016, 11, 8).unwrap();
        assert_eq!(parse_date_safe(Some("11/8/2016"), &formats), Some(expected));
        assert_eq!(parse_date_safe(Some("2016-11-08"), &formats), Some(expected));
        assert_eq!(
            parse_date_safe(Some("2016-11-08 00:00:00"), &formats),
            Some(expected)
        );
        assert_eq!(
            parse_date_safe(Some("11/8/2016 0:00"), &formats),
            Some(expected)
        );
        assert_eq!(parse_date_safe(Some("not a date"), &formats), None);
        assert_eq!(parse_date_safe(Some("  "), &formats), None);
    }

    #[test]
    fn test_days_diff_can_be_negative() {
        let a = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();
        let b = NaiveDate::from_ymd_opt(2020, 1, 7).unwrap();
        assert_eq!(days_diff(a, b), -3);
        assert_eq!(days_diff(b, a), 3);
    }

    #[test]
    fn test_month_start() {
        let d = NaiveDate::from_ymd_opt(2019, 2, 28).unwrap();
        assert_eq!(month_start(d), NaiveDate::from_ymd_opt(2019, 2, 1).unwrap());
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234567.4), "$1,234,567");
        assert_eq!(format_currency(-56.2), "-$56");
        assert_eq!(format_currency(-0.2), "$0");
        assert_eq!(format_number(1234.5, 2), "1,234.50");
    }
}
