//! Raw table rows as they appear in the exported files, and their coercion
//! into typed records.

use std::collections::HashMap;

use serde::Deserialize;

use crate::core::{
    HoldingsError, PositionRecord, TickerFacts,
    numeric::{parse_date, parse_fraction, parse_number, parse_scaled},
};

pub(crate) const COL_TICKER: &str = "Ticker";
pub(crate) const COL_OWNER: &str = "Owner Name";
pub(crate) const COL_DATE: &str = "Date";
pub(crate) const COL_SHARES_HELD: &str = "Shares Held";
pub(crate) const COL_SHARES_CHANGE: &str = "Shares Change";

pub(crate) const COL_TSO: &str = "Total Shares Outstanding";
pub(crate) const COL_THV: &str = "Total Holdings Value";
pub(crate) const COL_INST_OWN: &str = "Institutional Ownership %";
#[cfg(feature = "parquet")]
pub(crate) const COL_SECTOR: &str = "Sector";
#[cfg(feature = "parquet")]
pub(crate) const COL_INDUSTRY: &str = "Industry";

pub(crate) const POSITION_COLUMNS: &[&str] = &[COL_TICKER, COL_OWNER, COL_DATE, COL_SHARES_HELD];
pub(crate) const FACTS_COLUMNS: &[&str] = &[COL_TICKER, COL_TSO, COL_THV, COL_INST_OWN];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPosition {
    #[serde(rename = "Ticker")]
    pub ticker: Option<String>,
    #[serde(rename = "Owner Name")]
    pub owner: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Shares Held")]
    pub shares_held: Option<String>,
    #[serde(rename = "Shares Change")]
    pub shares_change: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawFacts {
    #[serde(rename = "Ticker")]
    pub ticker: Option<String>,
    #[serde(rename = "Total Shares Outstanding")]
    pub total_shares_outstanding: Option<String>,
    #[serde(rename = "Total Holdings Value")]
    pub total_holdings_value: Option<String>,
    #[serde(rename = "Institutional Ownership %")]
    pub institutional_ownership: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
}

/// Fails with a `Schema` error (row 0) naming the first required column not in `headers`.
pub(crate) fn require_columns<'h>(
    input: &str,
    headers: impl IntoIterator<Item = &'h str> + Clone,
    required: &[&str],
) -> Result<(), HoldingsError> {
    for col in required {
        if !headers.clone().into_iter().any(|h| h.trim() == *col) {
            return Err(HoldingsError::Schema {
                input: input.to_string(),
                row: 0,
                column: (*col).to_string(),
                reason: "missing column".into(),
            });
        }
    }
    Ok(())
}

struct RowCtx<'a> {
    input: &'a str,
    row: usize,
}

impl RowCtx<'_> {
    fn err(&self, column: &str, reason: impl Into<String>) -> HoldingsError {
        HoldingsError::Schema {
            input: self.input.to_string(),
            row: self.row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    fn text(&self, column: &str, raw: Option<String>) -> Result<String, HoldingsError> {
        raw.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.err(column, "value is empty"))
    }

    /// `None` for empty/placeholder cells; an error for text that is not a number.
    fn optional(
        &self,
        column: &str,
        raw: Option<&str>,
        parse: fn(&str) -> Option<f64>,
    ) -> Result<Option<f64>, HoldingsError> {
        let Some(s) = raw else { return Ok(None) };
        if is_placeholder(s) {
            return Ok(None);
        }
        parse(s)
            .map(Some)
            .ok_or_else(|| self.err(column, format!("not a number: {s:?}")))
    }
}

fn is_placeholder(s: &str) -> bool {
    let t = s.trim();
    t.is_empty()
        || ["-", "--", "na", "n/a", "nan", "none", "null"]
            .iter()
            .any(|p| t.eq_ignore_ascii_case(p))
}

/// Coerces raw position rows. When `has_change_column` is false the deltas are
/// reconstructed from consecutive reports of the same (ticker, owner) pair.
pub(crate) fn positions_from_raw(
    input: &str,
    rows: Vec<RawPosition>,
    has_change_column: bool,
) -> Result<Vec<PositionRecord>, HoldingsError> {
    let mut out = Vec::with_capacity(rows.len());
    for (i, raw) in rows.into_iter().enumerate() {
        let cx = RowCtx { input, row: i + 1 };

        let ticker = cx.text(COL_TICKER, raw.ticker)?;
        let owner = cx.text(COL_OWNER, raw.owner)?;
        let date_text = cx.text(COL_DATE, raw.date)?;
        let date = parse_date(&date_text)
            .ok_or_else(|| cx.err(COL_DATE, format!("not a date: {date_text:?}")))?;

        let shares_held = cx
            .optional(COL_SHARES_HELD, raw.shares_held.as_deref(), parse_scaled)?
            .ok_or_else(|| cx.err(COL_SHARES_HELD, "value is empty"))?;
        if shares_held < 0.0 {
            return Err(cx.err(COL_SHARES_HELD, "negative holding"));
        }
        let shares_change =
            cx.optional(COL_SHARES_CHANGE, raw.shares_change.as_deref(), parse_scaled)?;

        out.push(PositionRecord {
            ticker,
            owner,
            date,
            shares_held,
            shares_change,
        });
    }

    if !has_change_column {
        reconstruct_changes(&mut out);
    }
    Ok(out)
}

/// Fills `shares_change` from the previous report of the same (ticker, owner).
/// A pair's first report counts its whole holding as the change.
pub(crate) fn reconstruct_changes(records: &mut [PositionRecord]) {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&records[a], &records[b]);
        (&ra.ticker, &ra.owner, ra.date).cmp(&(&rb.ticker, &rb.owner, rb.date))
    });

    let mut last: HashMap<(String, String), f64> = HashMap::new();
    for idx in order {
        let rec = &records[idx];
        let key = (rec.ticker.clone(), rec.owner.clone());
        let change = match last.get(&key) {
            Some(&prev) => rec.shares_held - prev,
            None => rec.shares_held,
        };
        last.insert(key, rec.shares_held);
        records[idx].shares_change = Some(change);
    }
}

pub(crate) fn facts_from_raw(
    input: &str,
    rows: Vec<RawFacts>,
) -> Result<Vec<TickerFacts>, HoldingsError> {
    let mut out = Vec::with_capacity(rows.len());
    for (i, raw) in rows.into_iter().enumerate() {
        let cx = RowCtx { input, row: i + 1 };

        let ticker = cx.text(COL_TICKER, raw.ticker)?;
        let total_shares_outstanding =
            cx.optional(COL_TSO, raw.total_shares_outstanding.as_deref(), parse_number)?;
        let total_holdings_value =
            cx.optional(COL_THV, raw.total_holdings_value.as_deref(), parse_number)?;
        let institutional_ownership = cx.optional(
            COL_INST_OWN,
            raw.institutional_ownership.as_deref(),
            parse_fraction,
        )?;

        out.push(TickerFacts {
            ticker,
            total_shares_outstanding,
            institutional_ownership,
            total_holdings_value,
            sector: label(raw.sector),
            industry: label(raw.industry),
        });
    }
    Ok(out)
}

fn label(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !is_placeholder(s))
}
