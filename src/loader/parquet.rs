use std::fs;
use std::path::Path;

use polars::prelude::*;

use super::wire::{
    COL_DATE, COL_INDUSTRY, COL_INST_OWN, COL_OWNER, COL_SECTOR, COL_SHARES_CHANGE,
    COL_SHARES_HELD, COL_THV, COL_TICKER, COL_TSO, RawFacts, RawPosition, require_columns,
};
use crate::core::HoldingsError;

fn read_frame(path: &Path, required: &[&str]) -> Result<DataFrame, HoldingsError> {
    let input = path.display().to_string();
    let file = fs::File::open(path).map_err(|e| HoldingsError::unavailable(&input, e.to_string()))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| HoldingsError::unavailable(&input, format!("read: {e}")))?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    require_columns(&input, names.iter().map(String::as_str), required)?;
    Ok(df)
}

/// Every cell of `name` rendered as text; `None` where the column is absent or the cell is null.
///
/// Values go through the same text normalisation as CSV input, so typed and
/// text-typed Parquet files load identically.
fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, HoldingsError> {
    let Ok(col) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    let series = col.as_materialized_series().cast(&DataType::String)?;
    let ca = series.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

pub(crate) fn read_positions(
    path: &Path,
    required: &[&str],
) -> Result<(Vec<RawPosition>, bool), HoldingsError> {
    let df = read_frame(path, required)?;
    let has_change = df.column(COL_SHARES_CHANGE).is_ok();

    let tickers = text_column(&df, COL_TICKER)?;
    let owners = text_column(&df, COL_OWNER)?;
    let dates = text_column(&df, COL_DATE)?;
    let held = text_column(&df, COL_SHARES_HELD)?;
    let change = text_column(&df, COL_SHARES_CHANGE)?;

    let rows = tickers
        .into_iter()
        .zip(owners)
        .zip(dates)
        .zip(held)
        .zip(change)
        .map(|((((ticker, owner), date), shares_held), shares_change)| RawPosition {
            ticker,
            owner,
            date,
            shares_held,
            shares_change,
        })
        .collect();
    Ok((rows, has_change))
}

pub(crate) fn read_facts(path: &Path, required: &[&str]) -> Result<Vec<RawFacts>, HoldingsError> {
    let df = read_frame(path, required)?;

    let tickers = text_column(&df, COL_TICKER)?;
    let tso = text_column(&df, COL_TSO)?;
    let thv = text_column(&df, COL_THV)?;
    let own = text_column(&df, COL_INST_OWN)?;
    let sector = text_column(&df, COL_SECTOR)?;
    let industry = text_column(&df, COL_INDUSTRY)?;

    let rows = tickers
        .into_iter()
        .zip(tso)
        .zip(thv)
        .zip(own)
        .zip(sector)
        .zip(industry)
        .map(
            |(((((ticker, tso), thv), own), sector), industry)| RawFacts {
                ticker,
                total_shares_outstanding: tso,
                total_holdings_value: thv,
                institutional_ownership: own,
                sector,
                industry,
            },
        )
        .collect();
    Ok(rows)
}
