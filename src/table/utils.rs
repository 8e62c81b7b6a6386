use once_cell::sync::Lazy;
use regex::Regex;

/// `1,234` / `-12,345.50` style numbers with comma thousands separators.
static GROUPED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("static regex"));

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Coerce a cell to a finite number. Anything else (empty, text, `NaN`,
/// `inf`) is missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    let v = match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) if GROUPED_NUMBER.is_match(s) => s.replace(',', "").parse().ok()?,
        Err(_) => return None,
    };
    v.is_finite().then_some(v)
}

pub fn parse_integer(raw: &str) -> Option<i64> {
    clean_str(raw).parse().ok()
}

/// Case-insensitive substring test; an empty needle never matches.
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    !needle_lower.is_empty() && haystack.to_lowercase().contains(needle_lower)
}
