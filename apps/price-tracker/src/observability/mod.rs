//! Observability - metrics and tracing instrumentation.

mod metrics;

/// Tracing subscriber and OTLP setup.
pub mod telemetry;

pub use metrics::{
    get_metrics_handle, init_metrics, record_fetch_failure, record_sample_stored,
    record_store_failure, set_tracked_assets,
};
