//! Row-level derivation: join context per ticker, then the metric formulas.

use crate::core::{HoldingsError, MarketQuote, PositionRecord, TickerFacts};
use crate::market::{LookupStage, MarketRef};

use super::model::{EnrichedPosition, PriceSource, Ratio};
use super::warnings::WarningTally;

/// Everything a row needs from its ticker's facts and market data.
#[derive(Debug)]
pub(crate) struct TickerContext<'a> {
    facts: Option<&'a TickerFacts>,
    price: f64,
    price_source: PriceSource,
    market_cap: Option<f64>,
    sector: Option<String>,
    industry: Option<String>,
}

impl<'a> TickerContext<'a> {
    /// Resolves the join for one ticker and tallies its ticker-level warnings.
    pub(crate) fn resolve(
        ticker: &str,
        facts: Option<&'a TickerFacts>,
        market: &MarketRef,
        tally: &mut WarningTally,
    ) -> Self {
        let quote: Option<&MarketQuote> = market.get(ticker);

        if facts.is_none() {
            tally.missing_facts(ticker);
        }
        for failure in market.failures().iter().filter(|f| f.ticker == ticker) {
            match failure.stage {
                LookupStage::Quote => tally.lookup_failed(ticker),
                LookupStage::Profile => tally.profile_lookup_failed(ticker),
            }
        }

        let market_price = quote
            .and_then(|q| q.price)
            .filter(|p| p.is_finite() && *p > 0.0);
        let (price, price_source) = match market_price {
            Some(p) => (p, PriceSource::Market),
            None => match facts.and_then(TickerFacts::reference_price) {
                Some(p) => {
                    tally.estimated_price(ticker);
                    (p, PriceSource::Estimated)
                }
                None => {
                    tally.missing_price(ticker);
                    (0.0, PriceSource::Missing)
                }
            },
        };

        let market_cap = quote.and_then(|q| q.market_cap).filter(|m| m.is_finite());
        if !market_cap.is_some_and(|m| m > 0.0) {
            tally.missing_market_cap(ticker);
        }

        let sector = facts
            .and_then(|f| f.sector.clone())
            .or_else(|| quote.and_then(|q| q.sector.clone()));
        let industry = facts
            .and_then(|f| f.industry.clone())
            .or_else(|| quote.and_then(|q| q.industry.clone()));

        Self {
            facts,
            price,
            price_source,
            market_cap,
            sector,
            industry,
        }
    }
}

/// Rejects values no formula can accept.
pub(crate) fn validate(row: usize, rec: &PositionRecord) -> Result<(), HoldingsError> {
    let at = || format!("row {row} ({} / {} / {})", rec.ticker, rec.owner, rec.date);
    if !rec.shares_held.is_finite() || rec.shares_held < 0.0 {
        return Err(HoldingsError::pipeline(format!(
            "{}: shares held must be a non-negative number, got {}",
            at(),
            rec.shares_held
        )));
    }
    if let Some(c) = rec.shares_change
        && !c.is_finite()
    {
        return Err(HoldingsError::pipeline(format!(
            "{}: shares change must be finite, got {c}",
            at()
        )));
    }
    Ok(())
}

/// Applies the metric formulas to one validated record.
pub(crate) fn derive(
    rec: &PositionRecord,
    cx: &TickerContext<'_>,
    tally: &mut WarningTally,
) -> EnrichedPosition {
    let shares_held = rec.shares_held;
    let shares_change = rec.shares_change.unwrap_or(0.0);
    let price = cx.price;

    let percentage_owned = match cx.facts.and_then(TickerFacts::shares_outstanding_units) {
        Some(units) => Ratio::percent(shares_held, units),
        None => Ratio::Undefined,
    };
    if percentage_owned.is_undefined() {
        tally.undefined_pct_owned(&rec.ticker);
    }

    let individual_holdings_value = shares_held * price / 1e6;
    let previous_shares = shares_held - shares_change;

    let shares_change_pct = if previous_shares == 0.0 {
        Ratio::NewPosition
    } else {
        Ratio::percent(shares_change, previous_shares)
    };

    let change_in_value = shares_change * price / 1e6;

    let change_pct_of_market_cap = match cx.market_cap {
        Some(cap) if cap > 0.0 => {
            let v = change_in_value * 1e6 / cap * 100.0;
            if v.is_finite() { v } else { 0.0 }
        }
        _ => 0.0,
    };

    EnrichedPosition {
        ticker: rec.ticker.clone(),
        owner: rec.owner.clone(),
        date: rec.date,
        shares_held,
        shares_change,
        total_shares_outstanding: cx.facts.and_then(|f| f.total_shares_outstanding),
        institutional_ownership: cx.facts.and_then(|f| f.institutional_ownership),
        total_holdings_value: cx.facts.and_then(|f| f.total_holdings_value),
        price_per_share: price,
        price_source: cx.price_source,
        market_cap: cx.market_cap,
        sector: cx.sector.clone(),
        industry: cx.industry.clone(),
        percentage_owned,
        individual_holdings_value,
        previous_shares,
        shares_change_pct,
        change_in_value,
        change_pct_of_market_cap,
    }
}
