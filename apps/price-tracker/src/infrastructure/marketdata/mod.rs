//! Market data API adapter.

/// Wire types for the upstream REST API.
pub mod api_types;

mod client;
mod mock;

pub use client::MarketDataClient;
pub use mock::MockMarketData;
