use polars::prelude::*;

/// Conversion of result tables into Polars DataFrames.
///
/// Implemented for the pipeline's numeric table and the loaded input tables so
/// results can be handed to dataframe tooling without re-deriving anything.
pub trait ToDataFrame {
    /// Converts the object into a Polars DataFrame.
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;

    /// Creates an empty DataFrame with the correct schema for this type.
    fn empty_dataframe() -> PolarsResult<DataFrame>
    where
        Self: Sized,
    {
        let cols: Vec<Column> = Self::schema()?
            .into_iter()
            .map(|(name, dtype)| Series::new_empty(name.into(), &dtype).into_column())
            .collect();
        DataFrame::new(cols)
    }

    /// Column names and types produced by [`to_dataframe`](Self::to_dataframe).
    fn schema() -> PolarsResult<Vec<(&'static str, DataType)>>
    where
        Self: Sized;
}

/// Days since the Unix epoch, as Polars stores `Date`.
pub(crate) fn epoch_days(d: chrono::NaiveDate) -> i32 {
    const UNIX_EPOCH_CE_DAYS: i32 = 719_163;
    chrono::Datelike::num_days_from_ce(&d) - UNIX_EPOCH_CE_DAYS
}
