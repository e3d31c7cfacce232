//! Unified error types for the refresh engine.
//!
//! Nothing in this crate is process-fatal: every error here is either logged
//! and dropped, or deferred to the next refresh opportunity.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Pair {base}/{rel} is not supported in either orientation")]
    UnsupportedPair { base: String, rel: String },

    #[error("Price history fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("OHLC transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Orderbook query failed: {0}")]
    Orderbook(#[from] OrderbookError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors from the upstream price-history query.
#[derive(Error, Debug)]
pub enum FetchError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    #[error("{0}")]
    Upstream(String),
}

/// Errors raised while normalizing a fetched dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Reciprocal of a zero price is undefined.
    #[error("Cannot invert candle: {field} is zero")]
    ZeroPrice { field: &'static str },

    /// The reciprocal overflowed or the price was not a number.
    #[error("Cannot invert candle: 1/{field} is not finite ({value})")]
    NonFiniteReciprocal { field: &'static str, value: f64 },

    /// A per-candle failure located within a dataset.
    #[error("Range {range}, candle {index}: {source}")]
    Candle {
        range: String,
        index: usize,
        #[source]
        source: Box<TransformError>,
    },
}

/// Errors from the orderbook snapshot query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderbookError {
    #[error("Backend unavailable")]
    Unavailable,

    #[error("No orderbook selected")]
    NoPairSelected,

    #[error("{0}")]
    Backend(String),
}

pub type RefreshResult<T> = Result<T, RefreshError>;
