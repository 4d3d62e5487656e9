// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Price Tracker - Crypto Watchlist Service
//!
//! Tracks a dynamic set of crypto assets. Each tracked asset gets one
//! background collector task that periodically polls an external market
//! data API and persists observed price samples; clients query the most
//! recent known price at or before a point in time.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Core types with no external I/O
//!   - `market`: price samples and series, including the source's
//!     "no data yet" convention
//!   - `tracking`: the registry of tracked assets and their cancellation
//!     handles
//!
//! - **Application**: Ports and tracking services
//!   - `ports`: interfaces for the validator, fetcher, and store
//!   - `services`: the start/stop lifecycle and the per-asset collector
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `marketdata`: REST client for asset validation and price history
//!   - `persistence`: PostgreSQL and in-memory price stores
//!   - `http`: axum JSON API plus health and metrics endpoints
//!   - `config`: environment-variable configuration
//!
//! # Data Flow
//!
//! ```text
//! POST /currency/add ──► TrackerService ──► WatchRegistry
//!                              │
//!                              └──► spawn PriceCollector ──┐
//!                                        (one per asset)   │ every poll
//!                                                          ▼
//! GET /currency/price ◄── PriceStore ◄── market data API fetch
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no external I/O.
pub mod domain;

/// Application layer - Ports and tracking services.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Observability - metrics and tracing.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::market::{PricePoint, PriceSample, PriceSeries};
pub use domain::tracking::WatchRegistry;

// Application services and ports
pub use application::ports::{AssetValidator, FetchError, PriceFetcher, PriceStore, StoreError};
pub use application::services::{CollectorSettings, PriceCollector, TrackerService, TrackingError};

// Infrastructure
pub use infrastructure::config::{ConfigError, TrackerConfig};
pub use infrastructure::http::{ApiServer, AppState, create_router};
pub use infrastructure::marketdata::{MarketDataClient, MockMarketData};
pub use infrastructure::persistence::{InMemoryPriceStore, PgPriceStore};

// Observability
pub use observability::{get_metrics_handle, init_metrics};
