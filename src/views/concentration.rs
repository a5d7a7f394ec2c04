use serde::Serialize;

use super::{Order, sort_by_value};
use crate::core::HoldingsError;
use crate::pipeline::EnrichedPosition;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolderSlice {
    pub owner: String,
    pub shares: f64,
    /// Percent of shares outstanding.
    pub percentage: f64,
}

/// Who owns a ticker: its largest holders, the rest of the reporting
/// institutions, and everyone else. The three parts sum to 100 %.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipBreakdown {
    pub ticker: String,
    pub top: Vec<HolderSlice>,
    pub other_institutional: f64,
    pub other_holders: f64,
}

/// Splits `ticker`'s `tso_millions` shares outstanding between its `n`
/// largest holders by shares held and the remainder.
///
/// # Errors
///
/// [`HoldingsError::InvalidParams`] if `tso_millions` is not a positive number.
pub fn ownership<'a, I>(
    rows: I,
    ticker: &str,
    tso_millions: f64,
    n: usize,
) -> Result<OwnershipBreakdown, HoldingsError>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    if !(tso_millions.is_finite() && tso_millions > 0.0) {
        return Err(HoldingsError::InvalidParams(format!(
            "shares outstanding for {ticker} must be positive, got {tso_millions}"
        )));
    }
    let total = tso_millions * 1e6;

    let mut held: Vec<&EnrichedPosition> =
        rows.into_iter().filter(|r| r.ticker == ticker).collect();
    held.sort_by(|a, b| {
        b.shares_held
            .total_cmp(&a.shares_held)
            .then_with(|| a.owner.cmp(&b.owner))
    });

    let institutional: f64 = held.iter().map(|r| r.shares_held).sum();
    let top: Vec<HolderSlice> = held
        .iter()
        .take(n)
        .map(|r| HolderSlice {
            owner: r.owner.clone(),
            shares: r.shares_held,
            percentage: r.shares_held / total * 100.0,
        })
        .collect();
    let top_shares: f64 = top.iter().map(|s| s.shares).sum();

    Ok(OwnershipBreakdown {
        ticker: ticker.to_string(),
        top,
        other_institutional: (institutional - top_shares) / total * 100.0,
        other_holders: (total - institutional) / total * 100.0,
    })
}

/// Concentration of one holder's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolderMetrics {
    pub owner: String,
    pub positions: usize,
    pub total_value: f64,
    /// Share of total value in the 5 largest positions, percent.
    pub top5_pct: f64,
    pub top10_pct: f64,
    /// Herfindahl-Hirschman index over value shares in percent (0..=10 000).
    pub hhi: f64,
    /// Positions owning more than 5 % of the company.
    pub over_5pct_owned: usize,
    pub over_10pct_owned: usize,
}

/// Returns `None` when `owner` has no rows.
pub fn holder_metrics<'a, I>(rows: I, owner: &str) -> Option<HolderMetrics>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
{
    let mut positions: Vec<&EnrichedPosition> =
        rows.into_iter().filter(|r| r.owner == owner).collect();
    if positions.is_empty() {
        return None;
    }
    sort_by_value(&mut positions, Order::Descending, |r| (r.individual_holdings_value, &r.ticker));

    let total: f64 = positions.iter().map(|r| r.individual_holdings_value).sum();
    let share = |v: f64| if total != 0.0 { v / total * 100.0 } else { 0.0 };
    let top_pct = |k: usize| {
        share(
            positions
                .iter()
                .take(k)
                .map(|r| r.individual_holdings_value)
                .sum(),
        )
    };
    let owned_over = |limit: f64| {
        positions
            .iter()
            .filter(|r| r.percentage_owned.value().is_some_and(|p| p > limit))
            .count()
    };

    Some(HolderMetrics {
        owner: owner.to_string(),
        positions: positions.len(),
        total_value: total,
        top5_pct: top_pct(5),
        top10_pct: top_pct(10),
        hhi: positions
            .iter()
            .map(|r| share(r.individual_holdings_value).powi(2))
            .sum(),
        over_5pct_owned: owned_over(5.0),
        over_10pct_owned: owned_over(10.0),
    })
}
