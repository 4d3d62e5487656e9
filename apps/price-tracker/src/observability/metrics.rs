//! Prometheus Metrics
//!
//! Exposes collection and tracking metrics via Prometheus text format.
//!
//! # Metrics
//!
//! - `tracker_samples_stored_total` - samples persisted, by asset
//! - `tracker_fetch_failures_total` - failed or unusable polls, by asset
//! - `tracker_store_failures_total` - failed store appends, by asset
//! - `tracker_tracked_assets` - current watchlist size
//!
//! Rendered at `GET /metrics` on the API server.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "tracker_samples_stored_total",
        "Price samples persisted to the store"
    );
    describe_counter!(
        "tracker_fetch_failures_total",
        "Polls that failed or returned no usable data"
    );
    describe_counter!(
        "tracker_store_failures_total",
        "Store appends that failed"
    );
    describe_gauge!("tracker_tracked_assets", "Currently tracked assets");
}

/// Record one persisted sample.
pub fn record_sample_stored(asset: &str) {
    counter!("tracker_samples_stored_total", "asset" => asset.to_string()).increment(1);
}

/// Record one failed or unusable poll.
pub fn record_fetch_failure(asset: &str) {
    counter!("tracker_fetch_failures_total", "asset" => asset.to_string()).increment(1);
}

/// Record one failed store append.
pub fn record_store_failure(asset: &str) {
    counter!("tracker_store_failures_total", "asset" => asset.to_string()).increment(1);
}

/// Update the watchlist size gauge.
pub fn set_tracked_assets(count: f64) {
    gauge!("tracker_tracked_assets").set(count);
}
