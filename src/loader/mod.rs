//! Reading the positions and ticker-facts tables.
//!
//! Both files are read once per call into typed records. CSV is always
//! supported; Parquet needs the `parquet` feature. The format is picked from the
//! file extension.

mod csv_table;
#[cfg(feature = "parquet")]
mod parquet;
mod wire;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::{HoldingsError, PositionRecord, TickerFacts};
use wire::{FACTS_COLUMNS, POSITION_COLUMNS, RawFacts, RawPosition};

/// Default positions file, relative to the working directory.
#[cfg(feature = "parquet")]
pub const DEFAULT_POSITIONS_PATH: &str = "institutional_holders.parquet";
/// Default ticker-facts file, relative to the working directory.
#[cfg(feature = "parquet")]
pub const DEFAULT_FACTS_PATH: &str = "general_data.parquet";
/// Default positions file, relative to the working directory.
#[cfg(not(feature = "parquet"))]
pub const DEFAULT_POSITIONS_PATH: &str = "institutional_holders.csv";
/// Default ticker-facts file, relative to the working directory.
#[cfg(not(feature = "parquet"))]
pub const DEFAULT_FACTS_PATH: &str = "general_data.csv";

/// Locations of the two input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub positions: PathBuf,
    pub facts: PathBuf,
}

impl Default for DataSources {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIONS_PATH, DEFAULT_FACTS_PATH)
    }
}

impl DataSources {
    pub fn new(positions: impl Into<PathBuf>, facts: impl Into<PathBuf>) -> Self {
        Self {
            positions: positions.into(),
            facts: facts.into(),
        }
    }

    /// Reads `HOLDINGS_POSITIONS` and `HOLDINGS_FACTS`, falling back to the default paths.
    pub fn from_env() -> Self {
        let positions = std::env::var_os("HOLDINGS_POSITIONS")
            .map_or_else(|| PathBuf::from(DEFAULT_POSITIONS_PATH), PathBuf::from);
        let facts = std::env::var_os("HOLDINGS_FACTS")
            .map_or_else(|| PathBuf::from(DEFAULT_FACTS_PATH), PathBuf::from);
        Self { positions, facts }
    }
}

/// The two typed input tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub positions: Vec<PositionRecord>,
    pub facts: Vec<TickerFacts>,
}

impl Dataset {
    /// Distinct tickers referenced by the positions table, sorted.
    pub fn tickers(&self) -> Vec<String> {
        self.positions
            .iter()
            .map(|p| p.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Facts for `ticker`, if the facts table has a row for it.
    pub fn facts_for(&self, ticker: &str) -> Option<&TickerFacts> {
        self.facts.iter().find(|f| f.ticker == ticker)
    }
}

/// Loads both tables. Any missing, unreadable or empty input fails the whole call.
#[tracing::instrument(
    skip_all,
    fields(positions = %sources.positions.display(), facts = %sources.facts.display())
)]
pub fn load(sources: &DataSources) -> Result<Dataset, HoldingsError> {
    let positions = load_positions(&sources.positions)?;
    let facts = load_facts(&sources.facts)?;
    tracing::info!(
        positions = positions.len(),
        facts = facts.len(),
        "loaded input tables"
    );
    Ok(Dataset { positions, facts })
}

/// Loads the positions table from `path`.
pub fn load_positions(path: &Path) -> Result<Vec<PositionRecord>, HoldingsError> {
    let input = path.display().to_string();
    let (rows, has_change): (Vec<RawPosition>, bool) = match Format::of(path)? {
        Format::Csv => {
            let table = csv_table::read::<RawPosition>(path, POSITION_COLUMNS)?;
            let has_change = table.has_column(wire::COL_SHARES_CHANGE);
            (table.rows, has_change)
        }
        #[cfg(feature = "parquet")]
        Format::Parquet => parquet::read_positions(path, POSITION_COLUMNS)?,
    };
    if rows.is_empty() {
        return Err(HoldingsError::unavailable(input, "table has no rows"));
    }
    if !has_change {
        tracing::debug!(%input, "no share-change column; deriving deltas from report history");
    }
    wire::positions_from_raw(&input, rows, has_change)
}

/// Loads the ticker-facts table from `path`.
pub fn load_facts(path: &Path) -> Result<Vec<TickerFacts>, HoldingsError> {
    let input = path.display().to_string();
    let rows: Vec<RawFacts> = match Format::of(path)? {
        Format::Csv => csv_table::read::<RawFacts>(path, FACTS_COLUMNS)?.rows,
        #[cfg(feature = "parquet")]
        Format::Parquet => parquet::read_facts(path, FACTS_COLUMNS)?,
    };
    if rows.is_empty() {
        return Err(HoldingsError::unavailable(input, "table has no rows"));
    }
    wire::facts_from_raw(&input, rows)
}

enum Format {
    Csv,
    #[cfg(feature = "parquet")]
    Parquet,
}

impl Format {
    fn of(path: &Path) -> Result<Self, HoldingsError> {
        if !path.is_file() {
            return Err(HoldingsError::unavailable(
                path.display().to_string(),
                "file not found",
            ));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            #[cfg(feature = "parquet")]
            Some("parquet") => Ok(Self::Parquet),
            #[cfg(not(feature = "parquet"))]
            Some("parquet") => Err(HoldingsError::unavailable(
                path.display().to_string(),
                "parquet input needs the `parquet` feature",
            )),
            _ => Err(HoldingsError::unavailable(
                path.display().to_string(),
                "unsupported file type (expected .csv or .parquet)",
            )),
        }
    }
}
