//! Presentation strings for the display table. Nothing here is ever parsed back.

use serde::Serialize;

use super::model::{EnrichedPosition, Ratio, UNKNOWN_LABEL};

pub const NEW_POSITION_LABEL: &str = "N/A (New position)";
pub const UNDEFINED_LABEL: &str = "N/A";

/// A display-only copy of one [`EnrichedPosition`]. Every field is a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub ticker: String,
    pub owner: String,
    pub date: String,
    pub shares_held: String,
    pub shares_change: String,
    pub previous_shares: String,
    pub percentage_owned: String,
    pub price_per_share: String,
    pub individual_holdings_value: String,
    pub shares_change_pct: String,
    pub change_in_value: String,
    pub change_pct_of_market_cap: String,
    pub market_cap: String,
    pub sector: String,
    pub industry: String,
}

impl From<&EnrichedPosition> for DisplayRow {
    fn from(p: &EnrichedPosition) -> Self {
        Self {
            ticker: p.ticker.clone(),
            owner: p.owner.clone(),
            date: p.date.format("%Y-%m-%d").to_string(),
            shares_held: format_count(p.shares_held),
            shares_change: format_count(p.shares_change),
            previous_shares: format_count(p.previous_shares),
            percentage_owned: format_ratio(p.percentage_owned),
            price_per_share: format_price(p.price_per_share),
            individual_holdings_value: format_millions(p.individual_holdings_value),
            shares_change_pct: format_ratio(p.shares_change_pct),
            change_in_value: format_millions(p.change_in_value),
            change_pct_of_market_cap: format_market_cap_impact(p.change_pct_of_market_cap),
            market_cap: p.market_cap.map_or_else(|| UNDEFINED_LABEL.to_string(), format_usd_scaled),
            sector: p.sector.clone().unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            industry: p.industry.clone().unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        }
    }
}

/// `5000000.0` → `"5,000,000"` (rounded to a whole share).
pub fn format_count(v: f64) -> String {
    group_thousands(&format!("{v:.0}"))
}

/// Percent with two decimals, or the sentinel label.
pub fn format_ratio(r: Ratio) -> String {
    match r {
        Ratio::Value(v) => format!("{v:.2}%"),
        Ratio::NewPosition => NEW_POSITION_LABEL.to_string(),
        Ratio::Undefined => UNDEFINED_LABEL.to_string(),
    }
}

/// A value already in USD millions: `12.3456` → `"$12.35M"`, `-1.5` → `"-$1.50M"`.
pub fn format_millions(v: f64) -> String {
    with_currency(v, |abs| format!("{}M", group_thousands(&format!("{abs:.2}"))))
}

pub fn format_price(v: f64) -> String {
    with_currency(v, |abs| group_thousands(&format!("{abs:.2}")))
}

/// Market-cap impact, four decimals: `0.00123` → `"0.0012%"`.
pub fn format_market_cap_impact(v: f64) -> String {
    format!("{v:.4}%")
}

/// Plain USD with a magnitude suffix: `2.5e9` → `"$2.50B"`.
pub fn format_usd_scaled(v: f64) -> String {
    with_currency(v, |abs| {
        let (scaled, suffix) = if abs >= 1e12 {
            (abs / 1e12, "T")
        } else if abs >= 1e9 {
            (abs / 1e9, "B")
        } else if abs >= 1e6 {
            (abs / 1e6, "M")
        } else if abs >= 1e3 {
            (abs / 1e3, "K")
        } else {
            (abs, "")
        };
        format!("{scaled:.2}{suffix}")
    })
}

fn with_currency(v: f64, body: impl Fn(f64) -> String) -> String {
    let s = body(v.abs());
    // "-0.00" style output is printed unsigned.
    let negative = v < 0.0 && s.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    if negative { format!("-${s}") } else { format!("${s}") }
}

/// Inserts `,` every three digits in the integer part of a formatted number.
fn group_thousands(s: &str) -> String {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", s),
    };
    let (int, frac) = match rest.find('.') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let is_zero = int.bytes().chain(frac.bytes()).all(|b| b == b'0' || b == b'.');
    let sign = if is_zero { "" } else { sign };
    format!("{sign}{grouped}{frac}")
}
