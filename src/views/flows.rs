//! Per-ticker position flows: where institutions opened, added to, trimmed or
//! closed positions.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{Order, sort_by_value};
use crate::pipeline::{EnrichedPosition, PositionChange};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerFlow {
    pub ticker: String,
    /// Distinct holders contributing to the flow.
    pub holders: usize,
    /// Σ change in value, USD millions.
    pub change_in_value: f64,
    /// Σ change as a percentage of market cap.
    pub change_pct_of_market_cap: f64,
}

/// Flows per ticker over the rows whose [`EnrichedPosition::kind`] is `kind`,
/// sorted by ticker.
pub fn ticker_flows<'a, I>(rows: I, kind: PositionChange) -> Vec<TickerFlow>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    aggregate(rows.into_iter().filter(|r| r.kind() == kind))
}

/// Tickers with positive share deltas (new and increased positions).
pub fn buying_pressure<'a, I>(rows: I) -> Vec<TickerFlow>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    aggregate(rows.into_iter().filter(|r| r.shares_change > 0.0))
}

/// Tickers with negative share deltas (decreased and closed positions).
pub fn selling_pressure<'a, I>(rows: I) -> Vec<TickerFlow>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    aggregate(rows.into_iter().filter(|r| r.shares_change < 0.0))
}

/// Net flow per ticker across every row, buyers and sellers netted out.
pub fn net_flows<'a, I>(rows: I) -> Vec<TickerFlow>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    aggregate(rows.into_iter().filter(|r| r.shares_change != 0.0))
}

/// Which flow figure to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlowMeasure {
    Holders,
    Value,
    MarketCapImpact,
}

/// Sorts `flows` by `measure` and keeps the first `n`.
pub fn top(
    mut flows: Vec<TickerFlow>,
    measure: FlowMeasure,
    order: Order,
    n: usize,
) -> Vec<TickerFlow> {
    sort_by_value(&mut flows, order, |f| {
        let v = match measure {
            FlowMeasure::Holders => f.holders as f64,
            FlowMeasure::Value => f.change_in_value,
            FlowMeasure::MarketCapImpact => f.change_pct_of_market_cap,
        };
        (v, &f.ticker)
    });
    flows.truncate(n);
    flows
}

fn aggregate<'a>(rows: impl Iterator<Item = &'a EnrichedPosition>) -> Vec<TickerFlow> {
    #[derive(Default)]
    struct Acc<'a> {
        holders: BTreeSet<&'a str>,
        value: f64,
        impact: f64,
    }

    let mut by_ticker: BTreeMap<&str, Acc<'_>> = BTreeMap::new();
    for r in rows {
        let acc = by_ticker.entry(&r.ticker).or_default();
        acc.holders.insert(&r.owner);
        acc.value += r.change_in_value;
        acc.impact += r.change_pct_of_market_cap;
    }
    by_ticker
        .into_iter()
        .map(|(ticker, acc)| TickerFlow {
            ticker: ticker.to_string(),
            holders: acc.holders.len(),
            change_in_value: acc.value,
            change_pct_of_market_cap: acc.impact,
        })
        .collect()
}
