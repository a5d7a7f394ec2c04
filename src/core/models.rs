use chrono::NaiveDate;
use serde::Serialize;

/* ----- INPUT TABLES (shared by loader/, pipeline/ and views/) ----- */

/// One institution's reported stake in one ticker at one report date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRecord {
    pub ticker: String,
    /// Institution name.
    pub owner: String,
    pub date: NaiveDate,
    /// Non-negative; may be fractional after unit conversions.
    pub shares_held: f64,
    /// Signed delta since the previous report for the same (ticker, owner) pair.
    /// `None` means the source left the cell empty; it is read as a zero delta.
    pub shares_change: Option<f64>,
}

impl PositionRecord {
    pub fn new(
        ticker: impl Into<String>,
        owner: impl Into<String>,
        date: NaiveDate,
        shares_held: f64,
        shares_change: Option<f64>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            owner: owner.into(),
            date,
            shares_held,
            shares_change,
        }
    }
}

/// Static and aggregate reference data for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickerFacts {
    pub ticker: String,
    /// Shares outstanding, in millions.
    pub total_shares_outstanding: Option<f64>,
    /// Aggregate institutional ownership as a fraction in `0..=1`.
    pub institutional_ownership: Option<f64>,
    /// Aggregate value of institutional holdings, USD millions.
    pub total_holdings_value: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl TickerFacts {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }

    /// Shares outstanding as a plain count, when known and positive.
    #[must_use]
    pub fn shares_outstanding_units(&self) -> Option<f64> {
        self.total_shares_outstanding
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v * 1e6)
    }

    /// Approximate price per share implied by the aggregate institutional position:
    /// `total_holdings_value / (total_shares_outstanding × institutional_ownership)`.
    ///
    /// This is an estimate, only meant as a stand-in when no market price is available.
    #[must_use]
    pub fn reference_price(&self) -> Option<f64> {
        let value = self.total_holdings_value?;
        let shares = self.total_shares_outstanding?;
        let fraction = self.institutional_ownership?;
        let held_millions = shares * fraction;
        if held_millions <= 0.0 {
            return None;
        }
        Some(value / held_millions).filter(|p| p.is_finite() && *p > 0.0)
    }
}

/* ----- MARKET REFERENCE (shared by core/client, market/ and pipeline/) ----- */

/// Market data for one ticker as returned by the quote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketQuote {
    /// Market capitalisation, USD.
    pub market_cap: Option<f64>,
    /// Last regular-session price, USD.
    pub price: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

/// Sector/industry classification for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetProfile {
    pub sector: Option<String>,
    pub industry: Option<String>,
}
