//! PostgreSQL Price Store
//!
//! Durable append-only storage of price samples via `sqlx`. Migrations are
//! embedded from `migrations/` and applied at startup.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::application::ports::{PriceStore, StoreError};
use crate::domain::market::PriceSample;
use crate::infrastructure::config::DatabaseSettings;

/// Price store backed by PostgreSQL.
pub struct PgPriceStore {
    pool: PgPool,
}

impl PgPriceStore {
    /// Connect to the database and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the pool cannot be created or
    /// a migration fails.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await
            .map_err(|e| StoreError::Database {
                message: e.to_string(),
            })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database {
                message: e.to_string(),
            })?;

        tracing::info!(
            max_connections = settings.max_connections,
            "database connected, migrations applied"
        );

        Ok(Self { pool })
    }

    /// Create a store over an existing pool (for testing).
    #[must_use]
    pub const fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PriceStore for PgPriceStore {
    async fn append(&self, sample: &PriceSample) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO price_samples (asset, price, observed_at) VALUES ($1, $2, $3)")
            .bind(&sample.asset)
            .bind(sample.price)
            .bind(sample.observed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database {
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn nearest_at_or_before(
        &self,
        asset: &str,
        timestamp_ms: i64,
    ) -> Result<PriceSample, StoreError> {
        let row = sqlx::query(
            r"
            SELECT asset, price, observed_at
            FROM price_samples
            WHERE asset = $1 AND observed_at <= $2
            ORDER BY observed_at DESC
            LIMIT 1
            ",
        )
        .bind(asset)
        .bind(timestamp_ms)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database {
            message: e.to_string(),
        })?;

        let Some(row) = row else {
            return Err(StoreError::NoData {
                asset: asset.to_string(),
                timestamp_ms,
            });
        };

        Ok(PriceSample {
            asset: row.try_get("asset").map_err(|e| StoreError::Database {
                message: e.to_string(),
            })?,
            price: row.try_get("price").map_err(|e| StoreError::Database {
                message: e.to_string(),
            })?,
            observed_at: row
                .try_get("observed_at")
                .map_err(|e| StoreError::Database {
                    message: e.to_string(),
                })?,
        })
    }
}
