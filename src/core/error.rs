use std::time::Duration;

use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
///
/// Per-ticker lookup failures and undefined metrics are not errors: they are
/// recovered locally and surfaced as [`crate::pipeline::Warning`]s next to an
/// otherwise complete result.
#[derive(Debug, Error)]
pub enum HoldingsError {
    /// An input table is missing, unreadable or empty. Fatal for a pipeline run.
    #[error("data unavailable for {input}: {reason}")]
    DataUnavailable {
        /// The input that could not be read (usually a file path).
        input: String,
        /// Why the input is unusable.
        reason: String,
    },

    /// A value in an input table could not be coerced to the expected type.
    #[error("{input}: row {row}, column '{column}': {reason}")]
    Schema {
        /// The input the row came from.
        input: String,
        /// One-based data row number (header excluded).
        row: usize,
        /// The offending column.
        column: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// The join/derive sequence could not complete. No partial output is produced.
    #[error("pipeline failed: {reason}")]
    Pipeline {
        /// The root cause.
        reason: String,
    },

    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A JSON payload could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSV input could not be decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A Parquet input or dataframe conversion failed.
    #[cfg(feature = "polars")]
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The provider is throttling requests (HTTP 429).
    #[error("Rate limited at {url}")]
    RateLimited {
        /// The throttled URL.
        url: String,
    },

    /// The provider failed with a 5xx status.
    #[error("Server error {status} at {url}")]
    ServerError {
        /// The HTTP status code.
        status: u16,
        /// The URL that failed.
        url: String,
    },

    /// Cookie or crumb acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A lookup did not complete within its time budget.
    #[error("lookup timed out after {after:?}")]
    Timeout {
        /// The budget that was exceeded.
        after: Duration,
    },

    /// The data received from the provider was in an unexpected format or was missing a field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// Invalid arguments were passed to an operation.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl HoldingsError {
    /// Maps a non-success HTTP status to the most specific variant.
    pub(crate) fn from_status(status: u16, url: impl Into<String>) -> Self {
        let url = url.into();
        match status {
            404 => Self::NotFound { url },
            429 => Self::RateLimited { url },
            500..=599 => Self::ServerError { status, url },
            _ => Self::Status { status, url },
        }
    }

    pub(crate) fn pipeline(reason: impl Into<String>) -> Self {
        Self::Pipeline {
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// `true` for conditions the caller must not paper over (no partial dataset may be used).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. } | Self::Schema { .. } | Self::Pipeline { .. }
        )
    }
}
