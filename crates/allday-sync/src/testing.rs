//! In-memory [`CatalogStore`] with injectable write failures.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use allday_core::{
    CatalogEntry, CatalogStats, CatalogStore, CouponRecord, PriceObservation, ProductRecord,
    StoreError,
};
use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
struct State {
    entries: Vec<CatalogEntry>,
    observations: Vec<PriceObservation>,
    coupons: Vec<CouponRecord>,
    catalog_writes: usize,
    unavailable: bool,
    fail_upserts: HashSet<String>,
    fail_appends: HashSet<i64>,
    fail_coupon_names: HashSet<String>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

fn backend(msg: &str) -> StoreError {
    StoreError::Backend(msg.to_owned())
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub(crate) fn unavailable(self) -> Self {
        self.with(|s| s.unavailable = true);
        self
    }

    pub(crate) fn fail_upsert_for(self, external_id: &str) -> Self {
        self.with(|s| s.fail_upserts.insert(external_id.to_owned()));
        self
    }

    pub(crate) fn fail_append_for(self, entry_id: i64) -> Self {
        self.with(|s| s.fail_appends.insert(entry_id));
        self
    }

    pub(crate) fn fail_coupon(self, coupon_name: &str) -> Self {
        self.with(|s| s.fail_coupon_names.insert(coupon_name.to_owned()));
        self
    }

    pub(crate) fn seed_entry(&self, record: &ProductRecord) -> i64 {
        self.with(|s| insert_entry(s, record).id)
    }

    pub(crate) fn seed_coupon(&self, coupon: CouponRecord) {
        self.with(|s| s.coupons.push(coupon));
    }

    pub(crate) fn entries(&self) -> Vec<CatalogEntry> {
        self.with(|s| s.entries.clone())
    }

    pub(crate) fn observations(&self) -> Vec<PriceObservation> {
        self.with(|s| s.observations.clone())
    }

    pub(crate) fn coupons(&self) -> Vec<CouponRecord> {
        self.with(|s| s.coupons.clone())
    }

    /// Number of `upsert_catalog_entry` calls that reached the store.
    pub(crate) fn catalog_writes(&self) -> usize {
        self.with(|s| s.catalog_writes)
    }
}

fn insert_entry(state: &mut State, record: &ProductRecord) -> CatalogEntry {
    let now = Utc::now();
    let entry = CatalogEntry {
        id: i64::try_from(state.entries.len()).unwrap() + 1,
        external_id: record.external_id.clone(),
        name: record.name.clone(),
        brand: record.brand.clone(),
        category: record.category.clone(),
        image_url: record.image_url.clone(),
        product_url: record.product_url.clone(),
        created_at: now,
        updated_at: now,
    };
    state.entries.push(entry.clone());
    entry
}

impl CatalogStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        if self.with(|s| s.unavailable) {
            Err(backend("connection refused"))
        } else {
            Ok(())
        }
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        Ok(self.with(|s| {
            s.entries
                .iter()
                .find(|e| e.external_id == external_id)
                .cloned()
        }))
    }

    async fn list_all_external_ids(&self) -> Result<HashMap<String, i64>, StoreError> {
        self.with(|s| {
            if s.unavailable {
                return Err(backend("connection refused"));
            }
            Ok(s.entries
                .iter()
                .map(|e| (e.external_id.clone(), e.id))
                .collect())
        })
    }

    async fn upsert_catalog_entry(
        &self,
        record: &ProductRecord,
    ) -> Result<CatalogEntry, StoreError> {
        self.with(|s| {
            if s.fail_upserts.contains(&record.external_id) {
                return Err(backend("unique violation"));
            }
            s.catalog_writes += 1;
            if let Some(entry) = s
                .entries
                .iter_mut()
                .find(|e| e.external_id == record.external_id)
            {
                entry.name.clone_from(&record.name);
                entry.brand.clone_from(&record.brand);
                entry.category.clone_from(&record.category);
                entry.image_url.clone_from(&record.image_url);
                entry.product_url.clone_from(&record.product_url);
                entry.updated_at = Utc::now();
                return Ok(entry.clone());
            }
            Ok(insert_entry(s, record))
        })
    }

    async fn append_price_observation(
        &self,
        entry_id: i64,
        price: i64,
        original_price: i64,
        discount_rate: i32,
        is_on_sale: bool,
    ) -> Result<PriceObservation, StoreError> {
        self.with(|s| {
            if s.fail_appends.contains(&entry_id) || !s.entries.iter().any(|e| e.id == entry_id) {
                return Err(backend("foreign key violation"));
            }
            let observation = PriceObservation {
                id: i64::try_from(s.observations.len()).unwrap() + 1,
                catalog_entry_id: entry_id,
                price,
                original_price,
                discount_rate,
                is_on_sale,
                recorded_at: Utc::now(),
            };
            s.observations.push(observation.clone());
            Ok(observation)
        })
    }

    async fn latest_price(&self, entry_id: i64) -> Result<Option<PriceObservation>, StoreError> {
        Ok(self.with(|s| {
            s.observations
                .iter()
                .rev()
                .find(|o| o.catalog_entry_id == entry_id)
                .cloned()
        }))
    }

    async fn find_coupon(
        &self,
        brand: &str,
        coupon_name: &str,
    ) -> Result<Option<CouponRecord>, StoreError> {
        Ok(self.with(|s| {
            s.coupons
                .iter()
                .find(|c| c.brand == brand && c.coupon_name == coupon_name)
                .cloned()
        }))
    }

    async fn upsert_coupon(&self, coupon: &CouponRecord) -> Result<CouponRecord, StoreError> {
        self.with(|s| {
            if s.fail_coupon_names.contains(&coupon.coupon_name) {
                return Err(backend("write timeout"));
            }
            let stored = CouponRecord {
                is_active: true,
                ..coupon.clone()
            };
            match s
                .coupons
                .iter_mut()
                .find(|c| c.brand == coupon.brand && c.coupon_name == coupon.coupon_name)
            {
                Some(existing) => *existing = stored.clone(),
                None => s.coupons.push(stored.clone()),
            }
            Ok(stored)
        })
    }

    async fn deactivate_expired_coupons(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(self.with(|s| {
            let mut changed = 0;
            for coupon in &mut s.coupons {
                if coupon.is_expired_at(now) {
                    coupon.is_active = false;
                    changed += 1;
                }
            }
            changed
        }))
    }

    async fn stats(&self) -> Result<CatalogStats, StoreError> {
        Ok(self.with(|s| CatalogStats {
            total_products: i64::try_from(s.entries.len()).unwrap(),
            active_coupons: i64::try_from(s.coupons.iter().filter(|c| c.is_active).count())
                .unwrap(),
        }))
    }
}

/// A listing record with a flat 10,000 price.
pub(crate) fn record(external_id: &str, brand: &str, category: &str) -> ProductRecord {
    ProductRecord {
        external_id: external_id.to_owned(),
        name: format!("name-{external_id}"),
        brand: brand.to_owned(),
        category: category.to_owned(),
        image_url: None,
        product_url: format!("https://shop.example/p?goodsNo={external_id}"),
        price: 10_000,
        original_price: 10_000,
        discount_rate: 0,
        is_on_sale: false,
    }
}
