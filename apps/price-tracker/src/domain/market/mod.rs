//! Market Data Types
//!
//! Value types for observed prices. A `PriceSeries` is what the market data
//! API returns for a history request; a `PriceSample` is the single
//! observation a collector extracts from it and hands to the price store.

/// One point in a price history series.
///
/// Timestamps are source-provided epoch milliseconds, not collection time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Epoch milliseconds of the observation.
    pub timestamp_ms: i64,
    /// Price at that instant.
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    #[must_use]
    pub const fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }
}

/// Time-ordered price history for one asset, oldest first.
///
/// The series owns the source's "no data yet" convention: an empty series,
/// or a series whose leading point carries a zero price, means the source
/// has nothing usable for this window and the whole series is discarded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    asset: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series from time-ordered points.
    #[must_use]
    pub fn new(asset: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            asset: asset.into(),
            points,
        }
    }

    /// Asset name as reported by the source.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Number of points in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the series carries usable data.
    ///
    /// A zero-priced leading point is the source's "no data yet" marker.
    #[must_use]
    pub fn has_usable_data(&self) -> bool {
        self.points.first().is_some_and(|p| p.price != 0.0)
    }

    /// The most recent point in the series.
    #[must_use]
    pub fn latest(&self) -> Option<PricePoint> {
        self.points.last().copied()
    }

    /// Extract the sample a collector should persist: the most recent point,
    /// or `None` when the series has no usable data.
    #[must_use]
    pub fn latest_sample(&self) -> Option<PriceSample> {
        if !self.has_usable_data() {
            return None;
        }
        self.latest()
            .map(|p| PriceSample::new(self.asset.clone(), p.price, p.timestamp_ms))
    }
}

/// One persisted price observation.
///
/// Immutable once constructed; after it is handed to the price store the
/// store owns it and the collector keeps no reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    /// Asset the observation belongs to.
    pub asset: String,
    /// Observed price.
    pub price: f64,
    /// Source-provided observation time, epoch milliseconds.
    pub observed_at: i64,
}

impl PriceSample {
    /// Create a new sample.
    #[must_use]
    pub fn new(asset: impl Into<String>, price: f64, observed_at: i64) -> Self {
        Self {
            asset: asset.into(),
            price,
            observed_at,
        }
    }
}
