//! The metrics pipeline: positions ⋈ ticker facts ⋈ market reference → derived metrics.
//!
//! [`process`] is a pure function of its inputs. It returns an immutable
//! [`PipelineOutput`] holding a numeric table, a display table built from the
//! same rows, and the aggregated warnings. It either produces all of that or
//! fails with [`HoldingsError::Pipeline`].
//!
//! Rows keep input order; views sort explicitly.

#[cfg(feature = "dataframe")]
mod dataframe;
mod derive;
pub mod display;
mod model;
mod warnings;

pub use display::DisplayRow;
pub use model::{EnrichedPosition, PositionChange, PriceSource, Ratio, UNKNOWN_LABEL};
pub use warnings::Warning;

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::{HoldingsError, PositionRecord, TickerFacts};
use crate::market::MarketRef;
use derive::TickerContext;
use warnings::WarningTally;

/// Derived rows with native numeric fields, for sorting, filtering and aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericTable {
    rows: Vec<EnrichedPosition>,
}

impl NumericTable {
    pub fn rows(&self) -> &[EnrichedPosition] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedPosition> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row for one (ticker, owner, date) key.
    pub fn find(&self, ticker: &str, owner: &str, date: NaiveDate) -> Option<&EnrichedPosition> {
        self.rows
            .iter()
            .find(|r| r.ticker == ticker && r.owner == owner && r.date == date)
    }
}

impl<'a> IntoIterator for &'a NumericTable {
    type Item = &'a EnrichedPosition;
    type IntoIter = std::slice::Iter<'a, EnrichedPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// The same rows as [`NumericTable`], formatted for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayTable {
    rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DisplayRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The immutable result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    numeric: NumericTable,
    display: DisplayTable,
    warnings: Vec<Warning>,
}

impl PipelineOutput {
    pub fn numeric(&self) -> &NumericTable {
        &self.numeric
    }

    pub fn display(&self) -> &DisplayTable {
        &self.display
    }

    /// One entry per warning kind, in a fixed order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Distinct report dates, most recent first.
    pub fn unique_dates(&self) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self.numeric.iter().map(|r| r.date).collect();
        dates.into_iter().rev().collect()
    }

    /// Rows reported on `date`.
    pub fn rows_on(&self, date: NaiveDate) -> Vec<&EnrichedPosition> {
        self.numeric.iter().filter(|r| r.date == date).collect()
    }

    pub fn into_parts(self) -> (NumericTable, DisplayTable, Vec<Warning>) {
        (self.numeric, self.display, self.warnings)
    }
}

/// Joins, derives and formats.
///
/// `facts` is indexed by ticker; when a ticker appears more than once its first
/// row is used. Inputs are only read.
///
/// # Errors
///
/// [`HoldingsError::Pipeline`] when `positions` is empty or a record holds a
/// value no formula accepts (negative or non-finite shares held, non-finite
/// delta). No partial output is returned.
#[tracing::instrument(skip_all, fields(positions = positions.len(), facts = facts.len()))]
pub fn process(
    positions: &[PositionRecord],
    facts: &[TickerFacts],
    market: &MarketRef,
) -> Result<PipelineOutput, HoldingsError> {
    if positions.is_empty() {
        return Err(HoldingsError::pipeline("join produced no rows: no position records"));
    }
    for (i, rec) in positions.iter().enumerate() {
        derive::validate(i + 1, rec)?;
    }

    let mut facts_by_ticker: HashMap<&str, &TickerFacts> = HashMap::with_capacity(facts.len());
    for f in facts {
        facts_by_ticker.entry(f.ticker.as_str()).or_insert(f);
    }

    let mut tally = WarningTally::default();
    let mut contexts: HashMap<&str, TickerContext<'_>> = HashMap::new();
    let mut rows = Vec::with_capacity(positions.len());

    for rec in positions {
        let ticker = rec.ticker.as_str();
        let cx = contexts.entry(ticker).or_insert_with(|| {
            TickerContext::resolve(
                ticker,
                facts_by_ticker.get(ticker).copied(),
                market,
                &mut tally,
            )
        });
        rows.push(derive::derive(rec, cx, &mut tally));
    }

    let warnings = tally.finish();
    for w in &warnings {
        tracing::warn!(warning = %w, "pipeline");
    }

    let display = DisplayTable {
        rows: rows.iter().map(DisplayRow::from).collect(),
    };
    tracing::info!(
        rows = rows.len(),
        tickers = contexts.len(),
        warnings = warnings.len(),
        "derived holdings metrics"
    );

    Ok(PipelineOutput {
        numeric: NumericTable { rows },
        display,
        warnings,
    })
}
