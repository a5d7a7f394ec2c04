use serde::Serialize;

use crate::pipeline::EnrichedPosition;

/// A numeric column rows can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    SharesHeld,
    PercentageOwned,
    HoldingsValue,
    SharesChange,
    SharesChangePct,
    ChangeInValue,
    MarketCapImpact,
}

impl Metric {
    /// The row's value for this metric; `None` for sentinel ratios.
    pub fn value(self, row: &EnrichedPosition) -> Option<f64> {
        match self {
            Self::SharesHeld => Some(row.shares_held),
            Self::PercentageOwned => row.percentage_owned.value(),
            Self::HoldingsValue => Some(row.individual_holdings_value),
            Self::SharesChange => Some(row.shares_change),
            Self::SharesChangePct => row.shares_change_pct.value(),
            Self::ChangeInValue => Some(row.change_in_value),
            Self::MarketCapImpact => Some(row.change_pct_of_market_cap),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Order {
    #[default]
    Descending,
    Ascending,
}

/// The `n` best rows by `metric`. Rows without a numeric value are left out,
/// so new positions never enter a percentage-change ranking. Ties keep input order.
pub fn top_n<'a, I>(rows: I, metric: Metric, order: Order, n: usize) -> Vec<&'a EnrichedPosition>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    let mut scored: Vec<(f64, &EnrichedPosition)> = rows
        .into_iter()
        .filter_map(|r| metric.value(r).map(|v| (v, r)))
        .collect();
    scored.sort_by(|(a, _), (b, _)| match order {
        Order::Descending => b.total_cmp(a),
        Order::Ascending => a.total_cmp(b),
    });
    scored.into_iter().take(n).map(|(_, r)| r).collect()
}
