//! In-memory price store for testing.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::{PriceStore, StoreError};
use crate::domain::market::PriceSample;

/// In-memory implementation of [`PriceStore`].
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryPriceStore {
    samples: RwLock<Vec<PriceSample>>,
}

impl InMemoryPriceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    /// Whether the store holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }

    /// All samples stored for `asset`, in insertion order.
    #[must_use]
    pub fn samples_for(&self, asset: &str) -> Vec<PriceSample> {
        self.samples
            .read()
            .iter()
            .filter(|s| s.asset == asset)
            .cloned()
            .collect()
    }

    /// Drop all samples.
    pub fn clear(&self) {
        self.samples.write().clear();
    }
}

#[async_trait]
impl PriceStore for InMemoryPriceStore {
    async fn append(&self, sample: &PriceSample) -> Result<(), StoreError> {
        self.samples.write().push(sample.clone());
        Ok(())
    }

    async fn nearest_at_or_before(
        &self,
        asset: &str,
        timestamp_ms: i64,
    ) -> Result<PriceSample, StoreError> {
        self.samples
            .read()
            .iter()
            .filter(|s| s.asset == asset && s.observed_at <= timestamp_ms)
            .max_by_key(|s| s.observed_at)
            .cloned()
            .ok_or(StoreError::NoData {
                asset: asset.to_string(),
                timestamp_ms,
            })
    }
}
