//! Sector and industry breakdowns. Rows without a label are grouped under
//! [`UNKNOWN_LABEL`](crate::pipeline::UNKNOWN_LABEL).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{Order, sort_by_value};
use crate::pipeline::EnrichedPosition;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum GroupBy {
    #[default]
    Sector,
    Industry,
}

impl GroupBy {
    pub fn label(self, row: &EnrichedPosition) -> &str {
        match self {
            Self::Sector => row.sector_label(),
            Self::Industry => row.industry_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group: String,
    /// Σ individual holdings value, USD millions.
    pub total_value: f64,
    /// Mean percentage owned over rows where it is defined; `None` if none are.
    pub mean_percentage_owned: Option<f64>,
    pub tickers: usize,
}

/// Totals per group, largest value first.
pub fn group_stats<'a, I>(rows: I, by: GroupBy) -> Vec<GroupStats>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    #[derive(Default)]
    struct Acc<'a> {
        value: f64,
        pct_sum: f64,
        pct_n: usize,
        tickers: BTreeSet<&'a str>,
    }

    let mut groups: BTreeMap<&str, Acc<'_>> = BTreeMap::new();
    for r in rows {
        let acc = groups.entry(by.label(r)).or_default();
        acc.value += r.individual_holdings_value;
        if let Some(p) = r.percentage_owned.value() {
            acc.pct_sum += p;
            acc.pct_n += 1;
        }
        acc.tickers.insert(&r.ticker);
    }

    let mut out: Vec<GroupStats> = groups
        .into_iter()
        .map(|(group, acc)| GroupStats {
            group: group.to_string(),
            total_value: acc.value,
            mean_percentage_owned: (acc.pct_n > 0).then(|| acc.pct_sum / acc.pct_n as f64),
            tickers: acc.tickers.len(),
        })
        .collect();
    sort_by_value(&mut out, Order::Descending, |g| (g.total_value, &g.group));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolderTotal {
    pub owner: String,
    pub total_value: f64,
    pub total_shares: f64,
}

/// The `n` largest holders by value within `group`.
pub fn top_holders_in_group<'a, I>(rows: I, by: GroupBy, group: &str, n: usize) -> Vec<HolderTotal>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    let mut owners: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for r in rows.into_iter().filter(|r| by.label(r) == group) {
        let e = owners.entry(&r.owner).or_default();
        e.0 += r.individual_holdings_value;
        e.1 += r.shares_held;
    }
    let mut out: Vec<HolderTotal> = owners
        .into_iter()
        .map(|(owner, (total_value, total_shares))| HolderTotal {
            owner: owner.to_string(),
            total_value,
            total_shares,
        })
        .collect();
    sort_by_value(&mut out, Order::Descending, |h| (h.total_value, &h.owner));
    out.truncate(n);
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupShare {
    pub group: String,
    pub value: f64,
    /// Share of the holder's total value, in percent.
    pub percentage: f64,
}

/// How one holder's portfolio splits across groups, largest first.
pub fn holder_composition<'a, I>(rows: I, owner: &str, by: GroupBy) -> Vec<GroupShare>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows.into_iter().filter(|r| r.owner == owner) {
        *groups.entry(by.label(r)).or_default() += r.individual_holdings_value;
    }
    let mut out = shares_of(groups);
    sort_by_value(&mut out, Order::Descending, |g| (g.value, &g.group));
    out
}

/// Holder × group pivot: for each holder, the percentage of their value in
/// each group. Holders are sorted by name; absent cells are omitted.
pub fn distribution<'a, I>(rows: I, by: GroupBy) -> BTreeMap<String, Vec<GroupShare>>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    let mut pivot: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for r in rows {
        *pivot
            .entry(&r.owner)
            .or_default()
            .entry(by.label(r))
            .or_default() += r.individual_holdings_value;
    }
    pivot
        .into_iter()
        .map(|(owner, groups)| (owner.to_string(), shares_of(groups)))
        .collect()
}

/// Which end of each group's ranking to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum End {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupConcentration {
    pub group: String,
    pub owner: String,
    /// The holder's share of the group's total value, in percent.
    pub pct_of_group: f64,
}

/// For every group, the `n` holders with the largest (or smallest) share of
/// that group's total value. Groups come out in label order.
pub fn market_concentration<'a, I>(
    rows: I,
    by: GroupBy,
    n: usize,
    end: End,
) -> Vec<GroupConcentration>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    let mut pivot: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for r in rows {
        *pivot
            .entry(by.label(r))
            .or_default()
            .entry(&r.owner)
            .or_default() += r.individual_holdings_value;
    }

    let order = match end {
        End::Top => Order::Descending,
        End::Bottom => Order::Ascending,
    };
    let mut out = Vec::new();
    for (group, owners) in pivot {
        let total: f64 = owners.values().sum();
        let mut ranked: Vec<GroupConcentration> = owners
            .into_iter()
            .map(|(owner, v)| GroupConcentration {
                group: group.to_string(),
                owner: owner.to_string(),
                pct_of_group: if total != 0.0 { v / total * 100.0 } else { 0.0 },
            })
            .collect();
        sort_by_value(&mut ranked, order, |c| (c.pct_of_group, &c.owner));
        ranked.truncate(n);
        out.extend(ranked);
    }
    out
}

fn shares_of(groups: BTreeMap<&str, f64>) -> Vec<GroupShare> {
    let total: f64 = groups.values().sum();
    groups
        .into_iter()
        .map(|(group, value)| GroupShare {
            group: group.to_string(),
            value,
            percentage: if total != 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect()
}
