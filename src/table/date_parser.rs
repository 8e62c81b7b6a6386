use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

/// `2024년 1월 5일`, with or without spaces.
static KOREAN_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일$").expect("static regex")
});

/// Parse a cell into a calendar day, dropping any time-of-day component.
///
/// Accepts ISO-like dashes, slashes and dots, compact `YYYYMMDD`, a
/// trailing time or fractional seconds, and the Korean `년 월 일` form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"').trim();
    if s.len() < 8 {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // strip fractional seconds / timezone suffix before trying datetimes
    let head = s.split(['.', '+', 'Z']).next().unwrap_or(s);
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(head, fmt) {
            return Some(dt.date());
        }
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }

    let caps = KOREAN_DATE.captures(s)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
