//! The persistence seam between the crawler and its catalog backend.
//!
//! Every method is an independent, individually atomic unit of work; callers
//! never need a multi-record transaction.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::coupons::CouponRecord;
use crate::products::{CatalogEntry, PriceObservation, ProductRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Row counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_products: i64,
    pub active_coupons: i64,
}

pub trait CatalogStore: Send + Sync {
    /// Cheap liveness check performed before any work begins.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> impl Future<Output = Result<Option<CatalogEntry>, StoreError>> + Send;

    /// Every known `external_id` mapped to its catalog id. Called once per run.
    fn list_all_external_ids(
        &self,
    ) -> impl Future<Output = Result<HashMap<String, i64>, StoreError>> + Send;

    /// Insert a new entry, or overwrite the mutable metadata of the entry
    /// with the same `external_id`. The surrogate id of an existing entry is
    /// preserved.
    fn upsert_catalog_entry(
        &self,
        record: &ProductRecord,
    ) -> impl Future<Output = Result<CatalogEntry, StoreError>> + Send;

    fn append_price_observation(
        &self,
        entry_id: i64,
        price: i64,
        original_price: i64,
        discount_rate: i32,
        is_on_sale: bool,
    ) -> impl Future<Output = Result<PriceObservation, StoreError>> + Send;

    fn latest_price(
        &self,
        entry_id: i64,
    ) -> impl Future<Output = Result<Option<PriceObservation>, StoreError>> + Send;

    fn find_coupon(
        &self,
        brand: &str,
        coupon_name: &str,
    ) -> impl Future<Output = Result<Option<CouponRecord>, StoreError>> + Send;

    /// Insert or overwrite by `(brand, coupon_name)`; the stored row is
    /// always active afterwards.
    fn upsert_coupon(
        &self,
        coupon: &CouponRecord,
    ) -> impl Future<Output = Result<CouponRecord, StoreError>> + Send;

    /// Deactivate every active coupon whose `expires_at` is strictly before
    /// `now`, returning how many rows changed.
    fn deactivate_expired_coupons(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn stats(&self) -> impl Future<Output = Result<CatalogStats, StoreError>> + Send;
}
