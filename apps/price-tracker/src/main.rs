//! Price Tracker Binary
//!
//! Starts the crypto watchlist service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin price-tracker
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `TRACKER_DATABASE_URL`: PostgreSQL connection URL
//! - `TRACKER_API_BASE_URL`: Market data API base URL
//! - `TRACKER_API_KEY`: Market data API key
//!
//! ## Optional
//! - `TRACKER_HTTP_PORT`: API server port (default: 8080)
//! - `TRACKER_DB_MAX_CONNECTIONS`: Connection pool size (default: 5)
//! - `TRACKER_API_TIMEOUT_SECS`: Market data request timeout (default: 10)
//! - `TRACKER_POLL_INTERVAL_SECS`: Poll interval per asset (default: 10)
//! - `TRACKER_LOOKBACK_SECS`: History window per poll (default: 86400)
//! - `OTEL_ENABLED`: Enable OTLP span export (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: price-tracker)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use price_tracker::infrastructure::http::{ApiServer, AppState};
use price_tracker::observability::telemetry;
use price_tracker::{
    MarketDataClient, PgPriceStore, TrackerConfig, TrackerService, WatchRegistry, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (tracing + OTLP)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting price tracker");

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics();

    let config = TrackerConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Price store (connects and applies migrations)
    let store = Arc::new(PgPriceStore::connect(&config.database).await?);

    // Market data client serves as both validator and fetcher
    let market_data = Arc::new(MarketDataClient::new(&config.market_data)?);

    let registry = Arc::new(WatchRegistry::new());
    let tracker = Arc::new(TrackerService::new(
        registry,
        Arc::clone(&market_data),
        Arc::clone(&market_data),
        Arc::clone(&store),
        config.collector.clone(),
        shutdown_token.clone(),
    ));

    // Spawn API server
    let state = AppState::new(tracker, store, env!("CARGO_PKG_VERSION").to_string());
    let server = ApiServer::new(config.server.http_port, state, shutdown_token.clone());
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "API server error");
        }
    });

    tracing::info!("Price tracker ready");

    await_shutdown(shutdown_token).await;

    tracing::info!("Price tracker stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration. Secrets stay redacted.
fn log_config(config: &TrackerConfig) {
    tracing::info!(
        http_port = config.server.http_port,
        poll_interval_secs = config.collector.poll_interval.as_secs(),
        lookback_secs = config.collector.lookback.as_secs(),
        market_data_url = %config.market_data.base_url,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT), then cancel everything.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    // Cancelling the root token stops the API server and every collector.
    shutdown_token.cancel();
}
