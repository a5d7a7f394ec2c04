//! One full refresh: load both tables, enrich every ticker, run the pipeline.

use chrono::NaiveDate;
use tracing::info;

use crate::core::{HoldingsError, MarketClient};
use crate::loader::{self, DataSources, Dataset};
use crate::market::MarketRef;
use crate::pipeline::{self, PipelineOutput, Warning};

/// The inputs and outputs of one refresh, kept together so views and callers
/// can trace a derived row back to what it was computed from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    dataset: Dataset,
    market: MarketRef,
    output: PipelineOutput,
}

impl Snapshot {
    /// Runs the pipeline over already-loaded data.
    ///
    /// # Errors
    ///
    /// Whatever [`pipeline::process`] returns.
    pub fn from_parts(dataset: Dataset, market: MarketRef) -> Result<Self, HoldingsError> {
        let output = pipeline::process(&dataset.positions, &dataset.facts, &market)?;
        Ok(Self {
            dataset,
            market,
            output,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn market(&self) -> &MarketRef {
        &self.market
    }

    pub fn output(&self) -> &PipelineOutput {
        &self.output
    }

    pub fn warnings(&self) -> &[Warning] {
        self.output.warnings()
    }

    /// Most recent report date, if any rows exist.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.output.unique_dates().into_iter().next()
    }

    pub fn into_output(self) -> PipelineOutput {
        self.output
    }
}

/// Loads `sources`, looks up market data for every ticker (and the asset
/// profile for tickers whose facts carry no sector), then derives the tables.
///
/// Lookup failures never fail the call; they surface as warnings on the output.
///
/// # Errors
///
/// Loading errors ([`HoldingsError::DataUnavailable`], [`HoldingsError::Schema`])
/// and [`HoldingsError::Pipeline`].
#[tracing::instrument(skip_all, fields(positions = %sources.positions.display()))]
pub async fn build_snapshot(
    sources: &DataSources,
    client: &MarketClient,
) -> Result<Snapshot, HoldingsError> {
    let dataset = loader::load(sources)?;
    let tickers = dataset.tickers();
    let unlabelled: Vec<String> = tickers
        .iter()
        .filter(|t| dataset.facts_for(t).is_none_or(|f| f.sector.is_none()))
        .cloned()
        .collect();

    let market = client
        .enrich_with_profiles(tickers.iter().cloned(), unlabelled.iter().cloned())
        .await;
    info!(
        tickers = tickers.len(),
        profiles = unlabelled.len(),
        failures = market.failures().len(),
        "market data ready"
    );

    Snapshot::from_parts(dataset, market)
}
