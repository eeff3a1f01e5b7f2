//! Cell-level parsing: dates and numbers.
//!
//! Both parsers are total: a value that cannot be interpreted yields `None`
//! (the null marker) and the caller decides whether that drops the row (date)
//! or only nulls the field (numbers).

use chrono::{NaiveDate, NaiveDateTime};

/// Date-only formats, tried in order. Numeric day/month layouts are read
/// day-first, which is how the upstream survey exports are written.
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
];

/// Datetime formats; the time part is discarded.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Coerce a cell to a finite float.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        assert_eq!(parse_date("2019-05-31"), Some(ymd(2019, 5, 31)));
        assert_eq!(parse_date(" 31-05-2019"), Some(ymd(2019, 5, 31)));
        assert_eq!(parse_date("31/05/2019"), Some(ymd(2019, 5, 31)));
        assert_eq!(parse_date("2019/05/31"), Some(ymd(2019, 5, 31)));
        assert_eq!(parse_date("31 May 2019"), Some(ymd(2019, 5, 31)));
        assert_eq!(parse_date("May 31, 2019"), Some(ymd(2019, 5, 31)));
        assert_eq!(parse_date("2019-05-31 00:00:00"), Some(ymd(2019, 5, 31)));
        assert_eq!(parse_date("2019-05-31T12:30:00"), Some(ymd(2019, 5, 31)));
    }

    #[test]
    fn numeric_layouts_are_day_first() {
        assert_eq!(parse_date("01/02/2020"), Some(ymd(2020, 2, 1)));
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2019-02-30"), None);
        assert_eq!(parse_date("32-01-2019"), None);
    }

    #[test]
    fn coerces_numbers_or_nulls() {
        assert_eq!(coerce_number(" 3.65 "), Some(3.65));
        assert_eq!(coerce_number("11999139.0"), Some(11999139.0));
        assert_eq!(coerce_number("-1e3"), Some(-1000.0));
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("n/a"), None);
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("inf"), None);
    }
}
