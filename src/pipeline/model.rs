use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// A ratio-like derived value that may have no numeric meaning.
///
/// `NewPosition` marks a holding with no prior baseline. `Undefined` marks a
/// ratio whose denominator was missing or zero. Neither is ever folded into a
/// number, and `Value` always holds a finite `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Ratio {
    Value(f64),
    NewPosition,
    Undefined,
}

impl Ratio {
    /// `numerator / denominator × 100`, or `Undefined` when the result would not be finite.
    #[must_use]
    pub fn percent(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Self::Undefined;
        }
        let v = numerator / denominator * 100.0;
        if v.is_finite() { Self::Value(v) } else { Self::Undefined }
    }

    /// The numeric value, if there is one.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::NewPosition | Self::Undefined => None,
        }
    }

    #[must_use]
    pub const fn is_new_position(self) -> bool {
        matches!(self, Self::NewPosition)
    }

    #[must_use]
    pub const fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Total order for sorting: `Undefined` < any value < `NewPosition`.
    ///
    /// A descending sort therefore lists new positions first and undefined ratios last.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        fn rank(r: &Ratio) -> u8 {
            match r {
                Ratio::Undefined => 0,
                Ratio::Value(_) => 1,
                Ratio::NewPosition => 2,
            }
        }
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a.total_cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}%"),
            Self::NewPosition => f.write_str(super::display::NEW_POSITION_LABEL),
            Self::Undefined => f.write_str(super::display::UNDEFINED_LABEL),
        }
    }
}

/// Where a row's price per share came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Last regular-session price from the market reference.
    Market,
    /// Estimated from the ticker's aggregate institutional holdings.
    Estimated,
    /// No price available; value-based metrics are zero.
    Missing,
}

/// How a holder's position moved since its previous report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionChange {
    /// No prior baseline and a non-zero holding.
    New,
    Increased,
    Decreased,
    /// Holding went to zero.
    Closed,
    Unchanged,
}

/// One position record joined with its ticker facts and market data, plus
/// every derived metric. Produced only by [`crate::pipeline::process`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPosition {
    pub ticker: String,
    pub owner: String,
    pub date: NaiveDate,
    pub shares_held: f64,
    /// Signed delta as used for the derived fields (an absent delta is zero).
    pub shares_change: f64,

    /// Millions of shares.
    pub total_shares_outstanding: Option<f64>,
    pub institutional_ownership: Option<f64>,
    /// USD millions.
    pub total_holdings_value: Option<f64>,
    pub price_per_share: f64,
    pub price_source: PriceSource,
    /// USD.
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,

    pub percentage_owned: Ratio,
    /// USD millions.
    pub individual_holdings_value: f64,
    pub previous_shares: f64,
    pub shares_change_pct: Ratio,
    /// USD millions.
    pub change_in_value: f64,
    /// Zero when the market cap is missing or zero.
    pub change_pct_of_market_cap: f64,
}

impl EnrichedPosition {
    /// Classifies the movement since the previous report.
    #[must_use]
    pub fn kind(&self) -> PositionChange {
        if self.shares_change_pct.is_new_position() && self.shares_held > 0.0 {
            PositionChange::New
        } else if self.shares_held == 0.0 && self.previous_shares > 0.0 {
            PositionChange::Closed
        } else if self.shares_change > 0.0 {
            PositionChange::Increased
        } else if self.shares_change < 0.0 {
            PositionChange::Decreased
        } else {
            PositionChange::Unchanged
        }
    }

    /// Sector label, `"Unknown"` when absent.
    #[must_use]
    pub fn sector_label(&self) -> &str {
        self.sector.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// Industry label, `"Unknown"` when absent.
    #[must_use]
    pub fn industry_label(&self) -> &str {
        self.industry.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// Group label used for a missing sector or industry.
pub const UNKNOWN_LABEL: &str = "Unknown";
