//! Centralized constants for default endpoints, UA and lookup limits.

use std::time::Duration;

/// Default desktop UA to avoid trivial bot blocking.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

/// Base URL for the Yahoo Finance v7 quote API (`?symbols=` is appended).
pub(crate) const DEFAULT_BASE_QUOTE_V7: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

/// Yahoo quoteSummary API base (symbol is appended).
pub(crate) const DEFAULT_BASE_QUOTE_API: &str =
    "https://query1.finance.yahoo.com/v10/finance/quoteSummary/";

/// A URL that returns a Set-Cookie header for Yahoo domains.
pub(crate) const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com/consent";

/// URL to fetch a crumb (requires cookie from `DEFAULT_COOKIE_URL`).
pub(crate) const DEFAULT_CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

/// Upper bound for a single lookup (one batch request, or one ticker).
pub(crate) const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Symbols per v7 request.
pub(crate) const DEFAULT_CHUNK_SIZE: usize = 50;

/// In-flight single-ticker lookups when falling back from a failed batch.
pub(crate) const DEFAULT_CONCURRENCY: usize = 4;
