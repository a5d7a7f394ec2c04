//! Normalisation of numeric-looking text as it arrives in exported holdings tables.
//!
//! Values such as `"5,000,000"`, `"$1,234"`, `"45.2%"` or `"1.5M"` are turned into
//! plain `f64`s. Placeholders (`""`, `"nan"`, `"N/A"`, `"-"`) map to `None`.

use chrono::{NaiveDate, NaiveDateTime};

const NULL_TOKENS: &[&str] = &["", "-", "--", "na", "n/a", "nan", "none", "null"];

fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

/// Parses a number, stripping thousands separators, currency symbols and percent signs.
///
/// Accounting negatives (`"(1,234)"`) are honoured. Non-finite results are rejected.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_null_token(s) {
        return None;
    }
    let (negative, body) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%' | ' ' | '_' | '\u{a0}'))
        .collect();
    if is_null_token(&cleaned) {
        return None;
    }
    let v: f64 = cleaned.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if negative { -v } else { v })
}

/// Like [`parse_number`], but also accepts a trailing magnitude suffix
/// (`k`/`K` thousands, `M` millions, `B` billions, `T` trillions).
#[must_use]
pub fn parse_scaled(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let (body, factor) = match s.chars().last() {
        Some('k' | 'K') => (&s[..s.len() - 1], 1e3),
        Some('M') => (&s[..s.len() - 1], 1e6),
        Some('B') => (&s[..s.len() - 1], 1e9),
        Some('T') => (&s[..s.len() - 1], 1e12),
        _ => (s, 1.0),
    };
    parse_number(body).map(|v| v * factor)
}

/// Parses an ownership share into a fraction in `0..=1`.
///
/// Text carrying a `%` sign is divided by 100; bare numbers are taken to be a fraction already.
#[must_use]
pub fn parse_fraction(raw: &str) -> Option<f64> {
    let v = parse_number(raw)?;
    if raw.contains('%') { Some(v / 100.0) } else { Some(v) }
}

/// Parses a report date. Accepts ISO dates, ISO date-times (the time part is dropped)
/// and US-style `MM/DD/YYYY`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if is_null_token(s) {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return Some(d);
    }
    // Timestamps rendered by dataframe libraries:
    // "2024-03-31 00:00:00.000", "2024-03-31T00:00:00Z".
    s.get(..10)
        .filter(|_| s.len() > 10 && matches!(s.as_bytes()[10], b' ' | b'T'))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}
