//! Core components shared by the rest of the crate.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The [`MarketClient`] and its builder.
//! - The primary [`HoldingsError`] type.
//! - The input table records ([`PositionRecord`], [`TickerFacts`]) and market models.
//! - Internal networking, authentication and caching logic.

/// Per-day cache and the clocks that drive it.
pub mod cache;
/// The market client (`MarketClient`), builder, and configuration.
pub mod client;
/// The primary error type (`HoldingsError`) for the crate.
pub mod error;
/// Shared data models used across loader, market and pipeline.
pub mod models;
/// Lenient parsing of numbers, percentages and dates found in input tables.
pub mod numeric;
pub(crate) mod quotes;
pub(crate) mod quotesummary;
/// Local ↔ provider ticker conventions.
pub mod symbols;

#[cfg(feature = "polars")]
pub mod dataframe;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::MarketClient`
pub use cache::{Clock, ManualClock, SystemClock};
pub use client::{Backoff, CacheMode, MarketClient, MarketClientBuilder, RetryConfig};
pub use error::HoldingsError;
pub use models::{AssetProfile, MarketQuote, PositionRecord, TickerFacts};
pub use symbols::SymbolMap;

#[cfg(feature = "polars")]
pub use dataframe::ToDataFrame;
