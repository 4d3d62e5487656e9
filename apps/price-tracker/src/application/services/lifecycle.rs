//! Tracking Lifecycle Service
//!
//! The operations that start and stop per-asset price collection. Start and
//! stop are race-free and idempotent under concurrent requests: for any
//! symbol, concurrent starts admit exactly one winner, and a stop tears down
//! exactly one collector without double-cancelling.
//!
//! Ordering inside `start_tracking` matters: validation runs before (and
//! outside) the registry lock, and the registry insert is the single
//! atomic decision point. A concurrent loser's validation call is wasted
//! work, which is acceptable since validation has no side effects on
//! tracked state.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AssetValidator, PriceFetcher, PriceStore};
use crate::application::services::collector::{CollectorSettings, PriceCollector};
use crate::domain::tracking::WatchRegistry;
use crate::observability::set_tracked_assets;

/// Errors from start/stop tracking requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// Empty or whitespace-only symbol.
    #[error("asset symbol must not be empty")]
    InvalidSymbol,

    /// The validator did not confirm the symbol as a quotable asset.
    #[error("unknown asset: {symbol}")]
    UnknownAsset {
        /// The rejected symbol.
        symbol: String,
    },

    /// The symbol is already being tracked.
    #[error("asset is already tracked: {symbol}")]
    AlreadyTracked {
        /// The duplicate symbol.
        symbol: String,
    },

    /// The symbol is not currently tracked.
    #[error("asset is not tracked: {symbol}")]
    NotTracked {
        /// The unknown symbol.
        symbol: String,
    },
}

/// Lifecycle controller for tracked assets.
///
/// Owns the registry and the collaborators a collector needs, plus a
/// service-wide shutdown token. Each collector observes a child of that
/// token, so stopping one asset cancels one collector and shutting the
/// service down cancels them all.
pub struct TrackerService<V, F, S> {
    registry: Arc<WatchRegistry>,
    validator: Arc<V>,
    fetcher: Arc<F>,
    store: Arc<S>,
    settings: CollectorSettings,
    shutdown: CancellationToken,
}

impl<V, F, S> TrackerService<V, F, S>
where
    V: AssetValidator + 'static,
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    /// Create a new tracker service.
    #[must_use]
    pub fn new(
        registry: Arc<WatchRegistry>,
        validator: Arc<V>,
        fetcher: Arc<F>,
        store: Arc<S>,
        settings: CollectorSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry,
            validator,
            fetcher,
            store,
            settings,
            shutdown,
        }
    }

    /// Start tracking `symbol` and launch its collector.
    ///
    /// Returns as soon as the collector is spawned; the first poll happens
    /// in the background one interval later.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidSymbol`] for empty input.
    /// - [`TrackingError::UnknownAsset`] when the validator does not
    ///   confirm the symbol.
    /// - [`TrackingError::AlreadyTracked`] when an entry already exists.
    pub async fn start_tracking(&self, symbol: &str) -> Result<(), TrackingError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(TrackingError::InvalidSymbol);
        }

        // Network lookup stays outside the registry lock.
        if !self.validator.is_known_asset(symbol).await {
            return Err(TrackingError::UnknownAsset {
                symbol: symbol.to_string(),
            });
        }

        let cancel = self.shutdown.child_token();
        if !self.registry.insert(symbol, cancel.clone()) {
            return Err(TrackingError::AlreadyTracked {
                symbol: symbol.to_string(),
            });
        }

        let collector = PriceCollector::new(
            symbol,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            self.settings.clone(),
            cancel,
        );
        tokio::spawn(collector.run());

        set_tracked_assets(self.registry.len() as f64);
        tracing::info!(symbol, "asset added to watchlist");
        Ok(())
    }

    /// Stop tracking `symbol` and cancel its collector.
    ///
    /// The registry removal and the handle read are one atomic step, so the
    /// returned handle is cancelled exactly once even under concurrent
    /// stop requests.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidSymbol`] for empty input.
    /// - [`TrackingError::NotTracked`] when no entry exists.
    pub fn stop_tracking(&self, symbol: &str) -> Result<(), TrackingError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(TrackingError::InvalidSymbol);
        }

        let Some(cancel) = self.registry.remove(symbol) else {
            return Err(TrackingError::NotTracked {
                symbol: symbol.to_string(),
            });
        };
        cancel.cancel();

        set_tracked_assets(self.registry.len() as f64);
        tracing::info!(symbol, "asset removed from watchlist");
        Ok(())
    }

    /// Whether `symbol` is currently tracked.
    #[must_use]
    pub fn is_tracked(&self, symbol: &str) -> bool {
        self.registry.contains(symbol)
    }

    /// Number of currently tracked assets.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of the tracked symbols.
    #[must_use]
    pub fn tracked_symbols(&self) -> Vec<String> {
        self.registry.symbols()
    }
}
