//! Market Data HTTP Client
//!
//! Implements asset validation and price history fetches against the
//! upstream market data REST API:
//!
//! - `GET /api/1/metadata?asset={symbol}&api_key={key}` - 200 confirms the
//!   symbol names a quotable asset.
//! - `GET /api/1/market/history?asset={symbol}&from={ms}&api_key={key}` -
//!   recent price history as `[timestamp_ms, price]` pairs.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

use super::api_types::HistoryResponse;
use crate::application::ports::{AssetValidator, FetchError, PriceFetcher};
use crate::domain::market::PriceSeries;
use crate::infrastructure::config::{ApiKey, MarketDataSettings};

/// HTTP client for the market data API.
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    client: Client,
    base_url: String,
    api_key: ApiKey,
}

impl MarketDataClient {
    /// Create a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(settings: &MarketDataSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| FetchError::Http {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        lookback: Duration,
    ) -> Result<HistoryResponse, FetchError> {
        let from_ms = Utc::now().timestamp_millis() - lookback.as_millis() as i64;
        let from = from_ms.to_string();
        let url = format!("{}/api/1/market/history", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("asset", symbol),
                ("from", from.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Http {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<HistoryResponse>()
            .await
            .map_err(|e| FetchError::Decode {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl AssetValidator for MarketDataClient {
    async fn is_known_asset(&self, symbol: &str) -> bool {
        let url = format!("{}/api/1/metadata", self.base_url);

        let result = self
            .client
            .get(&url)
            .query(&[("asset", symbol), ("api_key", self.api_key.as_str())])
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                // Fail closed: a lookup we cannot complete is "not known".
                tracing::debug!(symbol, error = %e, "asset metadata lookup failed");
                false
            }
        }
    }
}

#[async_trait]
impl PriceFetcher for MarketDataClient {
    async fn latest_prices(
        &self,
        symbol: &str,
        lookback: Duration,
    ) -> Result<PriceSeries, FetchError> {
        let response = self.fetch_history(symbol, lookback).await?;
        Ok(response.data.into_series())
    }
}
