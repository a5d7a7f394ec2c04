use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A recoverable condition met while deriving the tables.
///
/// Each kind is reported once per run, listing every affected ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The market reference could not be fetched for these tickers.
    LookupFailed { tickers: Vec<String> },
    /// Sector and industry could not be fetched for these tickers.
    ProfileLookupFailed { tickers: Vec<String> },
    /// No ticker-facts row for these tickers.
    MissingFacts { tickers: Vec<String> },
    /// No market price; the price was estimated from aggregate holdings.
    EstimatedPrice { tickers: Vec<String> },
    /// No market price and no estimate; value metrics use a price of 0.
    MissingPrice { tickers: Vec<String> },
    /// No usable market cap; market-cap impact is 0.
    MissingMarketCap { tickers: Vec<String> },
    /// A derived ratio had no usable denominator on `rows` rows.
    UndefinedMetric {
        metric: String,
        rows: usize,
        tickers: Vec<String>,
    },
}

impl Warning {
    /// Tickers this warning applies to.
    pub fn tickers(&self) -> &[String] {
        match self {
            Self::LookupFailed { tickers }
            | Self::ProfileLookupFailed { tickers }
            | Self::MissingFacts { tickers }
            | Self::EstimatedPrice { tickers }
            | Self::MissingPrice { tickers }
            | Self::MissingMarketCap { tickers }
            | Self::UndefinedMetric { tickers, .. } => tickers,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.tickers().join(", ");
        match self {
            Self::LookupFailed { .. } => write!(f, "market data lookup failed for: {list}"),
            Self::ProfileLookupFailed { .. } => write!(f, "sector lookup failed for: {list}"),
            Self::MissingFacts { .. } => write!(f, "no ticker facts for: {list}"),
            Self::EstimatedPrice { .. } => {
                write!(f, "no market price, using estimated price for: {list}")
            }
            Self::MissingPrice { .. } => {
                write!(f, "no price available, value metrics set to 0 for: {list}")
            }
            Self::MissingMarketCap { .. } => {
                write!(f, "no market cap, market-cap impact set to 0 for: {list}")
            }
            Self::UndefinedMetric { metric, rows, .. } => {
                write!(f, "{metric} undefined on {rows} rows for: {list}")
            }
        }
    }
}

/// Collects per-ticker conditions during a run and folds them into [`Warning`]s.
#[derive(Debug, Default)]
pub(crate) struct WarningTally {
    lookup_failed: BTreeSet<String>,
    profile_lookup_failed: BTreeSet<String>,
    missing_facts: BTreeSet<String>,
    estimated_price: BTreeSet<String>,
    missing_price: BTreeSet<String>,
    missing_market_cap: BTreeSet<String>,
    undefined_pct_owned: (usize, BTreeSet<String>),
}

impl WarningTally {
    pub(crate) fn lookup_failed(&mut self, ticker: &str) {
        self.lookup_failed.insert(ticker.to_string());
    }
    pub(crate) fn profile_lookup_failed(&mut self, ticker: &str) {
        self.profile_lookup_failed.insert(ticker.to_string());
    }
    pub(crate) fn missing_facts(&mut self, ticker: &str) {
        self.missing_facts.insert(ticker.to_string());
    }
    pub(crate) fn estimated_price(&mut self, ticker: &str) {
        self.estimated_price.insert(ticker.to_string());
    }
    pub(crate) fn missing_price(&mut self, ticker: &str) {
        self.missing_price.insert(ticker.to_string());
    }
    pub(crate) fn missing_market_cap(&mut self, ticker: &str) {
        self.missing_market_cap.insert(ticker.to_string());
    }
    pub(crate) fn undefined_pct_owned(&mut self, ticker: &str) {
        self.undefined_pct_owned.0 += 1;
        self.undefined_pct_owned.1.insert(ticker.to_string());
    }

    pub(crate) fn finish(self) -> Vec<Warning> {
        fn list(s: BTreeSet<String>) -> Vec<String> {
            s.into_iter().collect()
        }
        let mut out = Vec::new();
        if !self.lookup_failed.is_empty() {
            out.push(Warning::LookupFailed {
                tickers: list(self.lookup_failed),
            });
        }
        if !self.profile_lookup_failed.is_empty() {
            out.push(Warning::ProfileLookupFailed {
                tickers: list(self.profile_lookup_failed),
            });
        }
        if !self.missing_facts.is_empty() {
            out.push(Warning::MissingFacts {
                tickers: list(self.missing_facts),
            });
        }
        if !self.estimated_price.is_empty() {
            out.push(Warning::EstimatedPrice {
                tickers: list(self.estimated_price),
            });
        }
        if !self.missing_price.is_empty() {
            out.push(Warning::MissingPrice {
                tickers: list(self.missing_price),
            });
        }
        if !self.missing_market_cap.is_empty() {
            out.push(Warning::MissingMarketCap {
                tickers: list(self.missing_market_cap),
            });
        }
        let (rows, tickers) = self.undefined_pct_owned;
        if rows > 0 {
            out.push(Warning::UndefinedMetric {
                metric: "percentage_owned".into(),
                rows,
                tickers: list(tickers),
            });
        }
        out
    }
}
