//! Ports (Driven)
//!
//! Interfaces the tracking core depends on. Adapters live in the
//! infrastructure layer; tests substitute in-memory implementations.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::market::{PriceSample, PriceSeries};

/// Errors from a price history fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("market data request failed: {message}")]
    Http {
        /// Error details.
        message: String,
    },

    /// Non-success HTTP status from the source.
    #[error("market data request returned status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Response body did not match the expected shape.
    #[error("market data response could not be decoded: {message}")]
    Decode {
        /// Error details.
        message: String,
    },
}

/// Errors from the price store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No sample exists at or before the queried timestamp.
    #[error("no price sample for {asset} at or before {timestamp_ms}")]
    NoData {
        /// Queried asset.
        asset: String,
        /// Queried timestamp, epoch milliseconds.
        timestamp_ms: i64,
    },

    /// Underlying database failure.
    #[error("price store error: {message}")]
    Database {
        /// Error details.
        message: String,
    },
}

/// Confirms that a symbol names a real, quotable asset.
#[async_trait]
pub trait AssetValidator: Send + Sync {
    /// Whether the source knows `symbol`.
    ///
    /// Fails closed: any lookup error counts as "not known".
    async fn is_known_asset(&self, symbol: &str) -> bool;
}

/// Retrieves recent price history for an asset.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Fetch the price series for `symbol` covering the last `lookback`.
    ///
    /// The returned series is time-ordered, oldest first; callers take the
    /// last element as the most recent observation.
    async fn latest_prices(
        &self,
        symbol: &str,
        lookback: Duration,
    ) -> Result<PriceSeries, FetchError>;
}

/// Durable append-only store of price samples.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Persist one sample.
    async fn append(&self, sample: &PriceSample) -> Result<(), StoreError>;

    /// The sample with the greatest `observed_at` that does not exceed
    /// `timestamp_ms`, or [`StoreError::NoData`] when none exists.
    async fn nearest_at_or_before(
        &self,
        asset: &str,
        timestamp_ms: i64,
    ) -> Result<PriceSample, StoreError>;
}
