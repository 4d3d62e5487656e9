//! HTTP API
//!
//! JSON API for the watchlist and price queries, plus health and metrics
//! endpoints for orchestrators and monitoring.
//!
//! # Endpoints
//!
//! - `POST /currency/add` - start tracking an asset
//! - `POST /currency/remove` - stop tracking an asset
//! - `GET /currency/price?coin=BTC&timestamp=...` - nearest sample at or
//!   before the given epoch-millisecond timestamp
//! - `GET /health` - JSON health status
//! - `GET /healthz` - liveness probe
//! - `GET /metrics` - Prometheus metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AssetValidator, PriceFetcher, PriceStore, StoreError};
use crate::application::services::{TrackerService, TrackingError};
use crate::observability::get_metrics_handle;

// =============================================================================
// Application State
// =============================================================================

/// Shared state for the API server.
pub struct AppState<V, F, S> {
    tracker: Arc<TrackerService<V, F, S>>,
    store: Arc<S>,
    version: String,
    started_at: Instant,
}

impl<V, F, S> AppState<V, F, S> {
    /// Create new server state.
    #[must_use]
    pub fn new(tracker: Arc<TrackerService<V, F, S>>, store: Arc<S>, version: String) -> Self {
        Self {
            tracker,
            store,
            version,
            started_at: Instant::now(),
        }
    }
}

impl<V, F, S> Clone for AppState<V, F, S> {
    fn clone(&self) -> Self {
        Self {
            tracker: Arc::clone(&self.tracker),
            store: Arc::clone(&self.store),
            version: self.version.clone(),
            started_at: self.started_at,
        }
    }
}

/// Create the axum router with all endpoints.
#[must_use]
pub fn create_router<V, F, S>(state: AppState<V, F, S>) -> Router
where
    V: AssetValidator + 'static,
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    Router::new()
        .route("/currency/add", post(add_currency::<V, F, S>))
        .route("/currency/remove", post(remove_currency::<V, F, S>))
        .route("/currency/price", get(get_price::<V, F, S>))
        .route("/health", get(health::<V, F, S>))
        .route("/healthz", get(liveness))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Body of add/remove requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinRequest {
    /// Asset symbol.
    pub coin: String,
}

/// Success message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error.
    pub error: String,
}

/// Query string of a price request.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceQuery {
    /// Asset symbol.
    pub coin: String,
    /// Epoch milliseconds to query at.
    pub timestamp: i64,
}

/// Body of a successful price response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    /// Asset symbol.
    pub coin: String,
    /// Observed price.
    pub price: f64,
    /// Source-provided observation time, epoch milliseconds.
    pub timestamp: i64,
}

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Number of tracked assets.
    pub tracked_assets: usize,
    /// Tracked symbols, sorted.
    pub assets: Vec<String>,
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn add_currency<V, F, S>(
    State(state): State<AppState<V, F, S>>,
    Json(req): Json<CoinRequest>,
) -> Result<Json<MessageResponse>, ApiError>
where
    V: AssetValidator + 'static,
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    state.tracker.start_tracking(&req.coin).await?;
    Ok(Json(MessageResponse {
        message: "Currency added to watchlist".to_string(),
    }))
}

async fn remove_currency<V, F, S>(
    State(state): State<AppState<V, F, S>>,
    Json(req): Json<CoinRequest>,
) -> Result<Json<MessageResponse>, ApiError>
where
    V: AssetValidator + 'static,
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    state.tracker.stop_tracking(&req.coin)?;
    Ok(Json(MessageResponse {
        message: "Currency removed from watchlist".to_string(),
    }))
}

async fn get_price<V, F, S>(
    State(state): State<AppState<V, F, S>>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, ApiError>
where
    V: AssetValidator + 'static,
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    let coin = query.coin.trim();
    if coin.is_empty() {
        return Err(ApiError::bad_request("coin must not be empty"));
    }

    let sample = state.store.nearest_at_or_before(coin, query.timestamp).await?;
    Ok(Json(PriceResponse {
        coin: sample.asset,
        price: sample.price,
        timestamp: sample.observed_at,
    }))
}

async fn health<V, F, S>(State(state): State<AppState<V, F, S>>) -> Json<HealthResponse>
where
    V: AssetValidator + 'static,
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    let mut assets = state.tracker.tracked_symbols();
    assets.sort();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        tracked_assets: assets.len(),
        assets,
    })
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

// =============================================================================
// API Error
// =============================================================================

/// API error carrying the HTTP status it maps to.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<TrackingError> for ApiError {
    fn from(error: TrackingError) -> Self {
        let status = match &error {
            TrackingError::InvalidSymbol
            | TrackingError::UnknownAsset { .. }
            | TrackingError::AlreadyTracked { .. } => StatusCode::BAD_REQUEST,
            TrackingError::NotTracked { .. } => StatusCode::NOT_FOUND,
        };
        Self::new(status, error.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        let status = match &error {
            StoreError::NoData { .. } => StatusCode::NOT_FOUND,
            StoreError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// =============================================================================
// API Server
// =============================================================================

/// HTTP API server.
pub struct ApiServer<V, F, S> {
    port: u16,
    state: AppState<V, F, S>,
    cancel: CancellationToken,
}

impl<V, F, S> ApiServer<V, F, S>
where
    V: AssetValidator + 'static,
    F: PriceFetcher + 'static,
    S: PriceStore + 'static,
{
    /// Create a new API server.
    #[must_use]
    pub const fn new(port: u16, state: AppState<V, F, S>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), ApiServerError> {
        let app = create_router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ApiServerError::ServerFailed(e.to_string()))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::application::services::CollectorSettings;
    use crate::domain::market::PriceSample;
    use crate::domain::tracking::WatchRegistry;
    use crate::infrastructure::marketdata::MockMarketData;
    use crate::infrastructure::persistence::InMemoryPriceStore;

    type TestState = AppState<MockMarketData, MockMarketData, InMemoryPriceStore>;

    fn make_state(known: &[&str]) -> (TestState, Arc<InMemoryPriceStore>) {
        let market = Arc::new(MockMarketData::knowing(known));
        let store = Arc::new(InMemoryPriceStore::new());
        let tracker = Arc::new(TrackerService::new(
            Arc::new(WatchRegistry::new()),
            Arc::clone(&market),
            Arc::clone(&market),
            Arc::clone(&store),
            CollectorSettings {
                poll_interval: Duration::from_secs(600),
                lookback: Duration::from_secs(600),
            },
            CancellationToken::new(),
        ));

        (
            AppState::new(tracker, Arc::clone(&store), "test".to_string()),
            store,
        )
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn add_known_asset_returns_ok() {
        let (state, _) = make_state(&["BTC"]);
        let app = create_router(state);

        let response = app
            .oneshot(post_json("/currency/add", r#"{"coin":"BTC"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: MessageResponse = body_json(response).await;
        assert_eq!(body.message, "Currency added to watchlist");
    }

    #[tokio::test]
    async fn add_unknown_asset_returns_bad_request() {
        let (state, _) = make_state(&["BTC"]);
        let app = create_router(state);

        let response = app
            .oneshot(post_json("/currency/add", r#"{"coin":"FAKE"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = body_json(response).await;
        assert!(body.error.contains("unknown asset"));
    }

    #[tokio::test]
    async fn add_empty_symbol_returns_bad_request() {
        let (state, _) = make_state(&["BTC"]);
        let app = create_router(state);

        let response = app
            .oneshot(post_json("/currency/add", r#"{"coin":"  "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_add_returns_bad_request() {
        let (state, _) = make_state(&["BTC"]);
        let app = create_router(state);

        let first = app
            .clone()
            .oneshot(post_json("/currency/add", r#"{"coin":"BTC"}"#))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(post_json("/currency/add", r#"{"coin":"BTC"}"#))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = body_json(second).await;
        assert!(body.error.contains("already tracked"));
    }

    #[tokio::test]
    async fn remove_tracked_asset_then_remove_again() {
        let (state, _) = make_state(&["BTC"]);
        let app = create_router(state);

        app.clone()
            .oneshot(post_json("/currency/add", r#"{"coin":"BTC"}"#))
            .await
            .unwrap();

        let removed = app
            .clone()
            .oneshot(post_json("/currency/remove", r#"{"coin":"BTC"}"#))
            .await
            .unwrap();
        assert_eq!(removed.status(), StatusCode::OK);
        let body: MessageResponse = body_json(removed).await;
        assert_eq!(body.message, "Currency removed from watchlist");

        let again = app
            .oneshot(post_json("/currency/remove", r#"{"coin":"BTC"}"#))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn remove_untracked_asset_returns_not_found() {
        let (state, _) = make_state(&["BTC"]);
        let app = create_router(state);

        let response = app
            .oneshot(post_json("/currency/remove", r#"{"coin":"ETH"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn price_query_returns_nearest_sample() {
        let (state, store) = make_state(&["BTC"]);
        store
            .append(&PriceSample::new("BTC", 50_000.0, 1_000))
            .await
            .unwrap();
        store
            .append(&PriceSample::new("BTC", 51_000.0, 2_000))
            .await
            .unwrap();
        let app = create_router(state);

        let response = app
            .oneshot(get_req("/currency/price?coin=BTC&timestamp=2001"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: PriceResponse = body_json(response).await;
        assert_eq!(body.coin, "BTC");
        assert_eq!(body.price, 51_000.0);
        assert_eq!(body.timestamp, 2_000);
    }

    #[tokio::test]
    async fn price_query_before_first_sample_returns_not_found() {
        let (state, store) = make_state(&["BTC"]);
        store
            .append(&PriceSample::new("BTC", 50_000.0, 1_000))
            .await
            .unwrap();
        let app = create_router(state);

        let response = app
            .oneshot(get_req("/currency/price?coin=BTC&timestamp=999"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn price_query_with_bad_params_returns_bad_request() {
        let (state, _) = make_state(&["BTC"]);
        let app = create_router(state);

        // Missing timestamp
        let response = app
            .clone()
            .oneshot(get_req("/currency/price?coin=BTC"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Non-numeric timestamp
        let response = app
            .clone()
            .oneshot(get_req("/currency/price?coin=BTC&timestamp=soon"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Empty coin
        let response = app
            .oneshot(get_req("/currency/price?coin=&timestamp=1000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_tracked_assets() {
        let (state, _) = make_state(&["BTC", "ETH"]);
        let app = create_router(state);

        for coin in [r#"{"coin":"BTC"}"#, r#"{"coin":"ETH"}"#] {
            let response = app
                .clone()
                .oneshot(post_json("/currency/add", coin))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: HealthResponse = body_json(response).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.tracked_assets, 2);
        assert_eq!(body.assets, vec!["BTC".to_string(), "ETH".to_string()]);
    }

    #[tokio::test]
    async fn liveness_returns_ok() {
        let (state, _) = make_state(&[]);
        let app = create_router(state);

        let response = app.oneshot(get_req("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
