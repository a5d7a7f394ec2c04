//! How widely holders and tickers overlap.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{Order, sort_by_value};
use crate::pipeline::EnrichedPosition;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commonality {
    pub name: String,
    /// Distinct counterparts (tickers for a holder, holders for a ticker).
    pub count: usize,
    /// `count` as a percentage of all distinct counterparts in the rows.
    pub percentage: f64,
}

/// Holders whose distinct tickers cover at least `threshold` percent of all
/// tickers in `rows`, most widespread first.
pub fn holders<'a, I>(rows: I, threshold: f64) -> Vec<Commonality>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    compute(rows, threshold, |r| (&r.owner, &r.ticker))
}

/// Tickers held by at least `threshold` percent of all holders in `rows`.
pub fn tickers<'a, I>(rows: I, threshold: f64) -> Vec<Commonality>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    compute(rows, threshold, |r| (&r.ticker, &r.owner))
}

fn compute<'a, I>(
    rows: I,
    threshold: f64,
    key: impl Fn(&'a EnrichedPosition) -> (&'a String, &'a String),
) -> Vec<Commonality>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    let mut by_group: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut universe: BTreeSet<&str> = BTreeSet::new();
    for r in rows {
        let (group, other) = key(r);
        by_group.entry(group).or_default().insert(other);
        universe.insert(other);
    }
    if universe.is_empty() {
        return Vec::new();
    }

    let total = universe.len() as f64;
    let mut out: Vec<Commonality> = by_group
        .into_iter()
        .map(|(name, set)| Commonality {
            name: name.to_string(),
            count: set.len(),
            percentage: set.len() as f64 / total * 100.0,
        })
        .filter(|c| c.percentage >= threshold)
        .collect();
    sort_by_value(&mut out, Order::Descending, |c| (c.percentage, &c.name));
    out
}
