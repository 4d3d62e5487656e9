//! Price Collector
//!
//! One collector task runs per tracked asset. Each poll interval it fetches
//! recent price history and appends the latest usable sample to the price
//! store; on cancellation it stops without touching the registry (the
//! lifecycle service already removed the entry before cancelling).
//!
//! Fetch and store failures are never fatal to the task: they are logged and
//! counted, and the next tick is the retry. Within one asset, ticks are
//! strictly ordered; tick N's store call finishes (or fails) before tick
//! N+1's fetch begins.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{PriceFetcher, PriceStore};
use crate::domain::tracking::WatchRegistry;
use crate::observability::{record_fetch_failure, record_sample_stored, record_store_failure};

/// Configuration for collector behavior.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Interval between polls.
    pub poll_interval: Duration,
    /// How far back each history request reaches.
    pub lookback: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            lookback: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Background price collector for a single tracked asset.
pub struct PriceCollector<F, S> {
    symbol: String,
    fetcher: Arc<F>,
    store: Arc<S>,
    registry: Arc<WatchRegistry>,
    settings: CollectorSettings,
    cancel: CancellationToken,
}

impl<F, S> PriceCollector<F, S>
where
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    /// Create a collector for `symbol` observing `cancel`.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        fetcher: Arc<F>,
        store: Arc<S>,
        registry: Arc<WatchRegistry>,
        settings: CollectorSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            fetcher,
            store,
            registry,
            settings,
            cancel,
        }
    }

    /// Run the collection loop until cancelled.
    ///
    /// Cancellation is checked race-free alongside the timer; the latency
    /// bound is one poll interval. If the loop ever ends without a
    /// cancellation, the collector clears its own registry entry so that
    /// "entry exists" keeps meaning "collector running".
    pub async fn run(self) {
        tracing::info!(symbol = %self.symbol, "price collection started");

        self.poll_until_cancelled().await;

        if self.cancel.is_cancelled() {
            tracing::info!(symbol = %self.symbol, "price collection stopped");
        } else {
            self.registry.remove(&self.symbol);
            tracing::error!(symbol = %self.symbol, "price collection ended without a stop request");
        }
    }

    async fn poll_until_cancelled(&self) {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // An interval's first tick completes immediately; consume it so the
        // first fetch lands one full interval after launch.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    return;
                }
                _ = ticker.tick() => {
                    self.collect_once().await;
                }
            }
        }
    }

    /// One fetch-and-store cycle. Failures leave the task running.
    async fn collect_once(&self) {
        let series = match self
            .fetcher
            .latest_prices(&self.symbol, self.settings.lookback)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                record_fetch_failure(&self.symbol);
                tracing::warn!(symbol = %self.symbol, error = %e, "price fetch failed");
                return;
            }
        };

        let Some(sample) = series.latest_sample() else {
            record_fetch_failure(&self.symbol);
            tracing::warn!(symbol = %self.symbol, "price history has no usable data yet");
            return;
        };

        match self.store.append(&sample).await {
            Ok(()) => {
                record_sample_stored(&self.symbol);
                tracing::debug!(
                    symbol = %self.symbol,
                    price = sample.price,
                    observed_at = sample.observed_at,
                    "price sample stored"
                );
            }
            Err(e) => {
                // No within-tick retry; the next tick fetches fresh data.
                record_store_failure(&self.symbol);
                tracing::error!(symbol = %self.symbol, error = %e, "failed to persist price sample");
            }
        }
    }
}
