use polars::prelude::*;

use super::{DisplayRow, DisplayTable, EnrichedPosition, NumericTable, PriceSource};
use crate::core::dataframe::{ToDataFrame, epoch_days};

fn price_source_label(s: PriceSource) -> &'static str {
    match s {
        PriceSource::Market => "market",
        PriceSource::Estimated => "estimated",
        PriceSource::Missing => "missing",
    }
}

fn strs<'a>(
    rows: &'a [EnrichedPosition],
    f: impl Fn(&'a EnrichedPosition) -> &'a str,
) -> Vec<&'a str> {
    rows.iter().map(f).collect()
}

fn floats(rows: &[EnrichedPosition], f: impl Fn(&EnrichedPosition) -> f64) -> Vec<f64> {
    rows.iter().map(f).collect()
}

fn opt_floats(
    rows: &[EnrichedPosition],
    f: impl Fn(&EnrichedPosition) -> Option<f64>,
) -> Vec<Option<f64>> {
    rows.iter().map(f).collect()
}

impl ToDataFrame for NumericTable {
    /// Ratio columns are nullable floats; `new_position` flags the sentinel rows.
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = self.rows();
        let dates: Vec<i32> = rows.iter().map(|r| epoch_days(r.date)).collect();

        DataFrame::new(vec![
            Column::new("ticker".into(), strs(rows, |r| r.ticker.as_str())),
            Column::new("owner".into(), strs(rows, |r| r.owner.as_str())),
            Column::new("date".into(), dates).cast(&DataType::Date)?,
            Column::new("shares_held".into(), floats(rows, |r| r.shares_held)),
            Column::new("shares_change".into(), floats(rows, |r| r.shares_change)),
            Column::new("previous_shares".into(), floats(rows, |r| r.previous_shares)),
            Column::new(
                "total_shares_outstanding".into(),
                opt_floats(rows, |r| r.total_shares_outstanding),
            ),
            Column::new(
                "institutional_ownership".into(),
                opt_floats(rows, |r| r.institutional_ownership),
            ),
            Column::new(
                "total_holdings_value".into(),
                opt_floats(rows, |r| r.total_holdings_value),
            ),
            Column::new("price_per_share".into(), floats(rows, |r| r.price_per_share)),
            Column::new(
                "price_source".into(),
                strs(rows, |r| price_source_label(r.price_source)),
            ),
            Column::new("market_cap".into(), opt_floats(rows, |r| r.market_cap)),
            Column::new("sector".into(), strs(rows, |r| r.sector_label())),
            Column::new("industry".into(), strs(rows, |r| r.industry_label())),
            Column::new(
                "percentage_owned".into(),
                opt_floats(rows, |r| r.percentage_owned.value()),
            ),
            Column::new(
                "individual_holdings_value".into(),
                floats(rows, |r| r.individual_holdings_value),
            ),
            Column::new(
                "shares_change_pct".into(),
                opt_floats(rows, |r| r.shares_change_pct.value()),
            ),
            Column::new(
                "new_position".into(),
                rows.iter()
                    .map(|r| r.shares_change_pct.is_new_position())
                    .collect::<Vec<bool>>(),
            ),
            Column::new("change_in_value".into(), floats(rows, |r| r.change_in_value)),
            Column::new(
                "change_pct_of_market_cap".into(),
                floats(rows, |r| r.change_pct_of_market_cap),
            ),
        ])
    }

    fn schema() -> PolarsResult<Vec<(&'static str, DataType)>> {
        Ok(vec![
            ("ticker", DataType::String),
            ("owner", DataType::String),
            ("date", DataType::Date),
            ("shares_held", DataType::Float64),
            ("shares_change", DataType::Float64),
            ("previous_shares", DataType::Float64),
            ("total_shares_outstanding", DataType::Float64),
            ("institutional_ownership", DataType::Float64),
            ("total_holdings_value", DataType::Float64),
            ("price_per_share", DataType::Float64),
            ("price_source", DataType::String),
            ("market_cap", DataType::Float64),
            ("sector", DataType::String),
            ("industry", DataType::String),
            ("percentage_owned", DataType::Float64),
            ("individual_holdings_value", DataType::Float64),
            ("shares_change_pct", DataType::Float64),
            ("new_position", DataType::Boolean),
            ("change_in_value", DataType::Float64),
            ("change_pct_of_market_cap", DataType::Float64),
        ])
    }
}

impl ToDataFrame for DisplayTable {
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = self.rows();
        let col = |name: &'static str, f: fn(&DisplayRow) -> &String| {
            Column::new(
                name.into(),
                rows.iter().map(|r| f(r).as_str()).collect::<Vec<&str>>(),
            )
        };
        DataFrame::new(vec![
            col("ticker", |r| &r.ticker),
            col("owner", |r| &r.owner),
            col("date", |r| &r.date),
            col("shares_held", |r| &r.shares_held),
            col("shares_change", |r| &r.shares_change),
            col("previous_shares", |r| &r.previous_shares),
            col("percentage_owned", |r| &r.percentage_owned),
            col("price_per_share", |r| &r.price_per_share),
            col("individual_holdings_value", |r| &r.individual_holdings_value),
            col("shares_change_pct", |r| &r.shares_change_pct),
            col("change_in_value", |r| &r.change_in_value),
            col("change_pct_of_market_cap", |r| &r.change_pct_of_market_cap),
            col("market_cap", |r| &r.market_cap),
            col("sector", |r| &r.sector),
            col("industry", |r| &r.industry),
        ])
    }

    fn schema() -> PolarsResult<Vec<(&'static str, DataType)>> {
        Ok([
            "ticker",
            "owner",
            "date",
            "shares_held",
            "shares_change",
            "previous_shares",
            "percentage_owned",
            "price_per_share",
            "individual_holdings_value",
            "shares_change_pct",
            "change_in_value",
            "change_pct_of_market_cap",
            "market_cap",
            "sector",
            "industry",
        ]
        .into_iter()
        .map(|n| (n, DataType::String))
        .collect())
    }
}
