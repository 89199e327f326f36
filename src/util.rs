// Utility helpers for normalizing CSV scalars and formatting console output.
//
// This module centralizes all the "dirty" CSV handling so the rest of the
// code can compare ids and flags without caring how the export spelled them.
// None of these helpers fail: malformed input degrades to `""`, `false` or `0.0`.
use chrono::NaiveDateTime;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use std::collections::HashSet;

static TRUTHY: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["true", "1", "yes", "y", "t"].into_iter().collect());

/// Canonicalize an identifier so that `"42"`, `" 42 "` and `"42.0"` compare equal.
///
/// - Trims whitespace; an empty value stays empty.
/// - Numeric values with no fractional part collapse to integer text.
/// - Other numeric values keep their shortest decimal form (`"042.50"` -> `"42.5"`).
/// - Anything else passes through trimmed.
pub fn normalize_id(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(n) = raw.parse::<i64>() {
        return n.to_string();
    }
    match raw.parse::<f64>() {
        Ok(num) if num.is_finite() => {
            if num.fract() == 0.0 && num.abs() < i64::MAX as f64 {
                (num as i64).to_string()
            } else {
                // f64 `Display` never switches to exponent notation.
                num.to_string()
            }
        }
        _ => raw.to_string(),
    }
}

/// Same as [`normalize_id`] for optional CSV cells.
pub fn normalize_opt(value: Option<&str>) -> String {
    value.map(normalize_id).unwrap_or_default()
}

/// Case-insensitive truthiness check used for every boolean column.
pub fn as_bool(value: Option<&str>) -> bool {
    match value {
        Some(v) => TRUTHY.contains(v.trim().to_lowercase().as_str()),
        None => false,
    }
}

/// Parse a numeric cell, returning `0.0` for anything empty or unparseable.
pub fn as_number(value: Option<&str>) -> f64 {
    parse_f64_safe(value).unwrap_or(0.0)
}

pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

pub fn parse_datetime_safe(s: Option<&str>) -> Option<NaiveDateTime> {
    // Exports use `YYYY-MM-DD HH:MM:SS`.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}

/// Trim an optional text cell into an owned string.
pub fn text(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g. `9,855 pairs checked`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_ids_collapse_to_integers() {
        assert_eq!(normalize_id("42.0"), "42");
        assert_eq!(normalize_id(" 42 "), "42");
        assert_eq!(normalize_id("042"), "42");
        assert_eq!(normalize_id("-0.0"), "0");
        assert_eq!(normalize_id("42.50"), "42.5");
    }

    #[test]
    fn non_numeric_ids_pass_through_trimmed() {
        assert_eq!(normalize_id("  BJCOO "), "BJCOO");
        assert_eq!(normalize_id("   "), "");
        assert_eq!(normalize_id(""), "");
        assert_eq!(normalize_opt(None), "");
    }

    #[test]
    fn booleans_accept_the_usual_spellings() {
        for v in ["TRUE", "true", " 1 ", "Yes", "y", "T"] {
            assert!(as_bool(Some(v)), "{v} should be true");
        }
        for v in ["FALSE", "0", "no", "", "truthy", "2"] {
            assert!(!as_bool(Some(v)), "{v} should be false");
        }
        assert!(!as_bool(None));
    }

    #[test]
    fn bad_numbers_default_to_zero() {
        assert_eq!(as_number(Some("21400.290")), 21400.29);
        assert_eq!(as_number(Some(" 12 ")), 12.0);
        assert_eq!(as_number(Some("n/a")), 0.0);
        assert_eq!(as_number(Some("")), 0.0);
        assert_eq!(as_number(None), 0.0);
    }

    #[test]
    fn timestamps_parse_or_stay_absent() {
        assert!(parse_datetime_safe(Some("2025-10-14 16:23:10")).is_some());
        assert!(parse_datetime_safe(Some("yesterday")).is_none());
        assert!(parse_datetime_safe(None).is_none());
    }

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
