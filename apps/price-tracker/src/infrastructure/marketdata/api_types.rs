//! Market Data API Wire Types
//!
//! Response shapes of the upstream market data REST API. The history
//! endpoint reports prices as `[timestamp_ms, price]` pairs, oldest first,
//! with timestamps serialized as JSON numbers.

use serde::Deserialize;

use crate::domain::market::{PricePoint, PriceSeries};

/// Envelope of the `/api/1/market/history` response.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    /// Payload.
    pub data: HistoryData,
}

/// Payload of a history response.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryData {
    /// Canonical asset name as reported by the source.
    pub name: String,
    /// `[timestamp_ms, price]` pairs, oldest first.
    #[serde(default)]
    pub price_history: Vec<[f64; 2]>,
}

impl HistoryData {
    /// Convert the wire pairs into a domain price series.
    #[must_use]
    pub fn into_series(self) -> PriceSeries {
        let points = self
            .price_history
            .into_iter()
            .map(|[ts, price]| PricePoint::new(ts as i64, price))
            .collect();
        PriceSeries::new(self.name, points)
    }
}
