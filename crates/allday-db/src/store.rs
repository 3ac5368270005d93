//! [`CatalogStore`] backed by Postgres.

use std::collections::HashMap;

use allday_core::{
    CatalogEntry, CatalogStats, CatalogStore, CouponRecord, PriceObservation, ProductRecord,
    StoreError,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{catalog, coupons, DbError};

/// Returns total catalog entries and currently active coupons.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn catalog_stats(pool: &PgPool) -> Result<CatalogStats, DbError> {
    let (total_products, active_coupons) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT \
             (SELECT COUNT(*) FROM catalog_entries), \
             (SELECT COUNT(*) FROM coupons WHERE is_active)",
    )
    .fetch_one(pool)
    .await?;

    Ok(CatalogStats {
        total_products,
        active_coupons,
    })
}

#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::ping(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        let row = catalog::find_catalog_entry(&self.pool, external_id).await?;
        Ok(row.map(CatalogEntry::from))
    }

    async fn list_all_external_ids(&self) -> Result<HashMap<String, i64>, StoreError> {
        Ok(catalog::list_external_ids(&self.pool).await?)
    }

    async fn upsert_catalog_entry(
        &self,
        record: &ProductRecord,
    ) -> Result<CatalogEntry, StoreError> {
        let row = catalog::upsert_catalog_entry(&self.pool, record).await?;
        Ok(row.into())
    }

    async fn append_price_observation(
        &self,
        entry_id: i64,
        price: i64,
        original_price: i64,
        discount_rate: i32,
        is_on_sale: bool,
    ) -> Result<PriceObservation, StoreError> {
        let row = catalog::append_price_observation(
            &self.pool,
            entry_id,
            price,
            original_price,
            discount_rate,
            is_on_sale,
        )
        .await?;
        Ok(row.into())
    }

    async fn latest_price(&self, entry_id: i64) -> Result<Option<PriceObservation>, StoreError> {
        let row = catalog::latest_price_observation(&self.pool, entry_id).await?;
        Ok(row.map(PriceObservation::from))
    }

    async fn find_coupon(
        &self,
        brand: &str,
        coupon_name: &str,
    ) -> Result<Option<CouponRecord>, StoreError> {
        coupons::find_coupon(&self.pool, brand, coupon_name)
            .await?
            .map(CouponRecord::try_from)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn upsert_coupon(&self, coupon: &CouponRecord) -> Result<CouponRecord, StoreError> {
        let row = coupons::upsert_coupon(&self.pool, coupon).await?;
        Ok(CouponRecord::try_from(row)?)
    }

    async fn deactivate_expired_coupons(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(coupons::deactivate_expired_coupons(&self.pool, now).await?)
    }

    async fn stats(&self) -> Result<CatalogStats, StoreError> {
        Ok(catalog_stats(&self.pool).await?)
    }
}
