//! Mock market data source for testing and development.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::application::ports::{AssetValidator, FetchError, PriceFetcher};
use crate::domain::market::{PricePoint, PriceSeries};

/// In-memory market data source.
///
/// Validates against a fixed set of known assets and replays queued fetch
/// results; when the queue runs dry the last result is repeated. Not for
/// production use.
#[derive(Debug, Default)]
pub struct MockMarketData {
    known_assets: HashSet<String>,
    results: Mutex<Vec<Result<Vec<PricePoint>, FetchError>>>,
    fetch_calls: Mutex<u32>,
}

impl MockMarketData {
    /// Create a source knowing the given assets and nothing else.
    #[must_use]
    pub fn knowing(symbols: &[&str]) -> Self {
        Self {
            known_assets: symbols.iter().map(|s| (*s).to_string()).collect(),
            results: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(0),
        }
    }

    /// Queue a successful fetch result.
    pub fn push_series(&self, points: Vec<(i64, f64)>) {
        self.results.lock().push(Ok(points
            .into_iter()
            .map(|(t, p)| PricePoint::new(t, p))
            .collect()));
    }

    /// Queue a failed fetch result.
    pub fn push_error(&self, error: FetchError) {
        self.results.lock().push(Err(error));
    }

    /// Number of fetches performed so far.
    #[must_use]
    pub fn fetch_calls(&self) -> u32 {
        *self.fetch_calls.lock()
    }
}

#[async_trait]
impl AssetValidator for MockMarketData {
    async fn is_known_asset(&self, symbol: &str) -> bool {
        self.known_assets.contains(symbol)
    }
}

#[async_trait]
impl PriceFetcher for MockMarketData {
    async fn latest_prices(
        &self,
        symbol: &str,
        _lookback: Duration,
    ) -> Result<PriceSeries, FetchError> {
        *self.fetch_calls.lock() += 1;

        let mut results = self.results.lock();
        let result = if results.len() > 1 {
            results.remove(0)
        } else {
            results.first().cloned().unwrap_or(Err(FetchError::Http {
                message: "mock has no queued results".to_string(),
            }))
        };
        result.map(|points| PriceSeries::new(symbol, points))
    }
}
