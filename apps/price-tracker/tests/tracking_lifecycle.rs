//! Tracking Lifecycle Integration Tests
//!
//! Exercises the full start -> collect -> query -> stop path using the
//! mock market data source and the in-memory price store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use price_tracker::{
    CollectorSettings, FetchError, MockMarketData, InMemoryPriceStore, PriceStore, StoreError,
    TrackerService, TrackingError, WatchRegistry,
};

const POLL: Duration = Duration::from_millis(20);

fn make_service(
    known: &[&str],
) -> (
    Arc<TrackerService<MockMarketData, MockMarketData, InMemoryPriceStore>>,
    Arc<MockMarketData>,
    Arc<InMemoryPriceStore>,
) {
    let market = Arc::new(MockMarketData::knowing(known));
    let store = Arc::new(InMemoryPriceStore::new());
    let service = Arc::new(TrackerService::new(
        Arc::new(WatchRegistry::new()),
        Arc::clone(&market),
        Arc::clone(&market),
        Arc::clone(&store),
        CollectorSettings {
            poll_interval: POLL,
            lookback: Duration::from_secs(60),
        },
        CancellationToken::new(),
    ));
    (service, market, store)
}

#[tokio::test]
async fn collects_and_answers_point_in_time_queries() {
    let (service, market, store) = make_service(&["BTC"]);
    market.push_series(vec![(1_000, 50_000.0)]);
    market.push_series(vec![(1_000, 50_000.0), (2_000, 51_000.0)]);

    service.start_tracking("BTC").await.unwrap();

    // Two poll intervals plus slack: both scripted series get collected.
    tokio::time::sleep(POLL * 2 + Duration::from_millis(15)).await;

    let latest = store.nearest_at_or_before("BTC", 2_001).await.unwrap();
    assert_eq!(latest.price, 51_000.0);
    assert_eq!(latest.observed_at, 2_000);

    // Nothing was observed before the first sample.
    let too_early = store.nearest_at_or_before("BTC", 999).await;
    assert!(matches!(too_early, Err(StoreError::NoData { .. })));

    service.stop_tracking("BTC").unwrap();
}

#[tokio::test]
async fn unknown_asset_never_launches_a_collector() {
    let (service, market, store) = make_service(&["BTC"]);

    let result = service.start_tracking("FAKE").await;
    assert!(matches!(result, Err(TrackingError::UnknownAsset { .. })));
    assert_eq!(service.tracked_count(), 0);

    tokio::time::sleep(POLL * 2).await;
    assert_eq!(market.fetch_calls(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn stop_halts_collection_within_one_interval() {
    let (service, market, _store) = make_service(&["BTC"]);
    market.push_series(vec![(1_000, 50_000.0)]);

    service.start_tracking("BTC").await.unwrap();
    tokio::time::sleep(POLL * 2).await;
    service.stop_tracking("BTC").unwrap();

    // Allow the in-flight tick to finish, then the count must stay flat.
    tokio::time::sleep(POLL + Duration::from_millis(10)).await;
    let calls_after_stop = market.fetch_calls();

    tokio::time::sleep(POLL * 3).await;
    assert_eq!(market.fetch_calls(), calls_after_stop);
}

#[tokio::test]
async fn transient_fetch_error_recovers_on_next_tick() {
    let (service, market, store) = make_service(&["BTC"]);
    market.push_error(FetchError::Http {
        message: "connection reset".to_string(),
    });
    market.push_series(vec![(3_000, 42.0)]);

    service.start_tracking("BTC").await.unwrap();
    tokio::time::sleep(POLL * 2 + Duration::from_millis(15)).await;
    service.stop_tracking("BTC").unwrap();

    // Tick 1 failed and stored nothing; tick 2 stored the sample.
    let samples = store.samples_for("BTC");
    assert!(!samples.is_empty());
    assert_eq!(samples[0].price, 42.0);
    assert!(market.fetch_calls() >= 2);
}

#[tokio::test]
async fn restart_after_stop_tracks_again() {
    let (service, market, store) = make_service(&["BTC"]);
    market.push_series(vec![(1_000, 50_000.0)]);

    service.start_tracking("BTC").await.unwrap();
    service.stop_tracking("BTC").unwrap();

    // The symbol can be tracked again after a stop.
    service.start_tracking("BTC").await.unwrap();
    assert!(service.is_tracked("BTC"));

    tokio::time::sleep(POLL + Duration::from_millis(15)).await;
    service.stop_tracking("BTC").unwrap();
    assert!(!store.is_empty());
}

#[tokio::test]
async fn independent_assets_collect_independently() {
    let (service, market, store) = make_service(&["BTC", "ETH"]);
    market.push_series(vec![(1_000, 7.0)]);

    service.start_tracking("BTC").await.unwrap();
    service.start_tracking("ETH").await.unwrap();
    assert_eq!(service.tracked_count(), 2);

    tokio::time::sleep(POLL + Duration::from_millis(15)).await;

    service.stop_tracking("BTC").unwrap();
    assert!(service.is_tracked("ETH"));

    service.stop_tracking("ETH").unwrap();
    assert_eq!(service.tracked_count(), 0);

    assert!(!store.samples_for("BTC").is_empty());
    assert!(!store.samples_for("ETH").is_empty());
}
