//! holdings-rs: institutional ownership analytics.
//!
//! Load a positions table and a ticker-facts table, enrich every ticker with
//! live market data from Yahoo Finance, and derive per-position metrics plus
//! ranking, overlap, flow, sector and concentration views.
//!
//! [`DataSources::from_env`] falls back to `institutional_holders.csv` and
//! `general_data.csv` in the working directory, or to the `.parquet` files of
//! the same names when the `parquet` feature is enabled.
//!
//! ```no_run
//! use holdings_rs::{DataSources, MarketClient, session};
//! use holdings_rs::views::{Metric, Order, rank};
//!
//! # async fn run() -> Result<(), holdings_rs::HoldingsError> {
//! let client = MarketClient::builder().daily_cache(true).build()?;
//! let snapshot = session::build_snapshot(&DataSources::from_env(), &client).await?;
//! for w in snapshot.warnings() {
//!     eprintln!("warning: {w}");
//! }
//! let rows = snapshot.output().numeric();
//! let top = rank::top_n(rows, Metric::HoldingsValue, Order::Descending, 10);
//! println!("{} rows, largest holder: {:?}", rows.len(), top.first().map(|r| &r.owner));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod loader;
pub mod market;
pub mod pipeline;
pub mod session;
pub mod views;

pub use crate::core::{
    AssetProfile, Backoff, CacheMode, Clock, HoldingsError, ManualClock, MarketClient,
    MarketClientBuilder, MarketQuote, PositionRecord, RetryConfig, SymbolMap, SystemClock,
    TickerFacts,
};
#[cfg(feature = "polars")]
pub use crate::core::ToDataFrame;
pub use loader::{DataSources, Dataset};
pub use market::{EnrichBuilder, LookupFailure, LookupStage, MarketRef};
pub use pipeline::{
    DisplayRow, DisplayTable, EnrichedPosition, NumericTable, PipelineOutput, PositionChange,
    PriceSource, Ratio, Warning, process,
};
pub use session::{Snapshot, build_snapshot};
