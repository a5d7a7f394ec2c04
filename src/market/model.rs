use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::core::MarketQuote;

/// Which lookup a [`LookupFailure`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LookupStage {
    /// Price / market-cap quote.
    Quote,
    /// Sector / industry profile.
    Profile,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quote => "quote",
            Self::Profile => "profile",
        })
    }
}

/// A per-ticker lookup that did not produce data. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFailure {
    pub ticker: String,
    pub stage: LookupStage,
    pub reason: String,
}

/// Market reference data keyed by local ticker, plus the lookups that failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketRef {
    quotes: HashMap<String, MarketQuote>,
    failures: Vec<LookupFailure>,
}

impl MarketRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ticker: &str) -> Option<&MarketQuote> {
        self.quotes.get(ticker)
    }

    pub fn insert(&mut self, ticker: impl Into<String>, quote: MarketQuote) {
        self.quotes.insert(ticker.into(), quote);
    }

    /// Records that the `stage` lookup for `ticker` failed.
    pub fn push_failure(
        &mut self,
        ticker: impl Into<String>,
        stage: LookupStage,
        reason: impl Into<String>,
    ) {
        self.failures.push(LookupFailure {
            ticker: ticker.into(),
            stage,
            reason: reason.into(),
        });
    }

    pub fn failures(&self) -> &[LookupFailure] {
        &self.failures
    }

    /// Sorted, de-duplicated tickers whose `stage` lookup failed.
    pub fn failed_tickers(&self, stage: LookupStage) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .failures
            .iter()
            .filter(|f| f.stage == stage)
            .map(|f| f.ticker.as_str())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MarketQuote)> {
        self.quotes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merges sector/industry into the entry for `ticker`, creating it if needed.
    pub(crate) fn set_profile(
        &mut self,
        ticker: &str,
        sector: Option<String>,
        industry: Option<String>,
    ) {
        let q = self.quotes.entry(ticker.to_string()).or_default();
        q.sector = sector;
        q.industry = industry;
    }

    pub(crate) fn merge(&mut self, other: MarketRef) {
        for (ticker, quote) in other.quotes {
            match self.quotes.get_mut(&ticker) {
                Some(existing) => {
                    existing.market_cap = existing.market_cap.or(quote.market_cap);
                    existing.price = existing.price.or(quote.price);
                    existing.sector = existing.sector.take().or(quote.sector);
                    existing.industry = existing.industry.take().or(quote.industry);
                }
                None => {
                    self.quotes.insert(ticker, quote);
                }
            }
        }
        self.failures.extend(other.failures);
    }
}

impl FromIterator<(String, MarketQuote)> for MarketRef {
    fn from_iter<T: IntoIterator<Item = (String, MarketQuote)>>(iter: T) -> Self {
        Self {
            quotes: iter.into_iter().collect(),
            failures: Vec::new(),
        }
    }
}
