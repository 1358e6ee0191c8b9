// Parsing helpers for the text that comes out of the weekly summary exports.
//
// Everything here is forgiving: bad input yields `None`, never a panic and
// never a default of zero, so callers can decide what "missing" means.
use crate::types::Channel;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

static WEEK_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)week\s*(\d{1,2})\s*,\s*(\d{4})").expect("week label pattern is valid")
});

const CURRENCY_SYMBOLS: [char; 3] = ['$', '£', '€'];

/// Extract `(week, year)` from a period header such as `"Week 05, 2024"`.
///
/// - Case-insensitive, whitespace around the tokens is optional.
/// - The pattern may be embedded in other text.
/// - Week numbers outside `1..=53` are rejected.
pub fn parse_week_label(label: &str) -> Option<(u32, i32)> {
    let caps = WEEK_LABEL.captures(label)?;
    let week: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[2].parse().ok()?;
    if !(1..=53).contains(&week) {
        return None;
    }
    Some((week, year))
}

/// Parse a currency-formatted cell into `f64`.
///
/// Currency symbols and thousands separators are stripped, and an amount
/// wrapped entirely in parentheses is read as negative (`"(1,234)"` is
/// `-1234`). Blank, `"-"`, `"N/A"` and the like give `None`.
pub fn parse_currency(s: Option<&str>) -> Option<f64> {
    let stripped: String = s?
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }
    let text = match accounting_negative(trimmed) {
        Some(inner) => format!("-{}", inner.trim()),
        None => trimmed.to_string(),
    };
    let v = text.parse::<f64>().ok()?;
    // `f64::from_str` accepts "NaN" and "inf", which are not amounts.
    v.is_finite().then_some(v)
}

/// Inner text of a fully parenthesized amount like `(500)`.
fn accounting_negative(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    if inner.contains(['(', ')']) {
        return None;
    }
    Some(inner)
}

pub fn average(v: &[f64]) -> Option<f64> {
    // Unlike a report cell, an empty group has no mean at all.
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators,
    // e.g. `1,234,567.89`.
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
    n.to_formatted_string(&Locale::en)
}

pub fn display_opt_money(v: &Option<f64>) -> String {
    match v {
        Some(v) => format_number(*v, 2),
        None => "-".to_string(),
    }
}

pub fn display_opt_channel(c: &Option<Channel>) -> String {
    c.map(|c| c.as_str().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_label_is_flexible_about_case_and_spacing() {
        assert_eq!(parse_week_label("Week 5, 2024"), Some((5, 2024)));
        assert_eq!(parse_week_label("week 05 , 2024"), Some((5, 2024)));
        assert_eq!(parse_week_label("WEEK52,2025"), Some((52, 2025)));
        assert_eq!(parse_week_label("FY Week 7, 2024 (actual)"), Some((7, 2024)));
    }

    #[test]
    fn week_label_rejects_other_periods() {
        assert_eq!(parse_week_label("Q1 2024"), None);
        assert_eq!(parse_week_label("Week 123, 2024"), None);
        assert_eq!(parse_week_label("Week 0, 2024"), None);
        assert_eq!(parse_week_label("Week 54, 2024"), None);
        assert_eq!(parse_week_label(""), None);
        assert_eq!(parse_week_label("Unnamed: 9"), None);
    }

    #[test]
    fn week_label_is_deterministic() {
        let a = parse_week_label("Week 31, 2025");
        let b = parse_week_label("Week 31, 2025");
        assert_eq!(a, b);
    }

    #[test]
    fn currency_plain_and_symbols() {
        assert_eq!(parse_currency(Some("$2,345")), Some(2345.0));
        assert_eq!(parse_currency(Some("$1,000")), Some(1000.0));
        assert_eq!(parse_currency(Some("  12.50 ")), Some(12.5));
        assert_eq!(parse_currency(Some("€1,000.25")), Some(1000.25));
        assert_eq!(parse_currency(Some("-$40")), Some(-40.0));
    }

    #[test]
    fn currency_accounting_negative() {
        assert_eq!(parse_currency(Some("(1,234)")), Some(-1234.0));
        assert_eq!(parse_currency(Some("(500)")), Some(-500.0));
        assert_eq!(parse_currency(Some("$(75.5)")), Some(-75.5));
        assert_eq!(parse_currency(Some(" ( 10 ) ")), Some(-10.0));
    }

    #[test]
    fn currency_unrelated_parentheses_do_not_misfire() {
        assert_eq!(parse_currency(Some("100 (est)")), None);
        assert_eq!(parse_currency(Some("(1)(2)")), None);
        assert_eq!(parse_currency(Some("((5))")), None);
    }

    #[test]
    fn currency_missing_is_none_not_zero() {
        assert_eq!(parse_currency(None), None);
        assert_eq!(parse_currency(Some("")), None);
        assert_eq!(parse_currency(Some("   ")), None);
        assert_eq!(parse_currency(Some("N/A")), None);
        assert_eq!(parse_currency(Some("-")), None);
        assert_eq!(parse_currency(Some("NaN")), None);
        assert_eq!(parse_currency(Some("inf")), None);
    }

    #[test]
    fn average_of_nothing_is_none() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-10.0, 2), "-10.00");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
