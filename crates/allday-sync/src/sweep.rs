use allday_core::{CatalogStore, StoreError};
use chrono::{DateTime, Utc};

/// Deactivates coupons whose expiry has passed.
pub struct ExpirationSweeper<'a, S> {
    store: &'a S,
}

impl<'a, S: CatalogStore> ExpirationSweeper<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Deactivate every active coupon that expired strictly before `now`.
    ///
    /// Sweeping unchanged data a second time deactivates nothing.
    ///
    /// # Errors
    ///
    /// Returns the store error if the update fails.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let deactivated = self.store.deactivate_expired_coupons(now).await?;
        if deactivated > 0 {
            tracing::info!(deactivated, "expired coupons deactivated");
        } else {
            tracing::debug!("no expired coupons");
        }
        Ok(deactivated)
    }
}

#[cfg(test)]
mod tests {
    use allday_core::{CouponRecord, DiscountType};
    use chrono::Duration;

    use super::*;
    use crate::testing::MemoryStore;

    fn coupon(name: &str, expires_at: Option<DateTime<Utc>>, is_active: bool) -> CouponRecord {
        CouponRecord {
            brand: "메디힐".to_owned(),
            coupon_name: name.to_owned(),
            discount_type: DiscountType::Percent,
            discount_value: 10,
            min_purchase: None,
            max_discount: None,
            expires_at,
            is_active,
        }
    }

    #[tokio::test]
    async fn second_sweep_over_unchanged_data_returns_zero() {
        let now = Utc::now();
        let store = MemoryStore::new();
        store.seed_coupon(coupon("expired", Some(now - Duration::hours(1)), true));
        store.seed_coupon(coupon("future", Some(now + Duration::days(1)), true));
        store.seed_coupon(coupon("open-ended", None, true));
        store.seed_coupon(coupon("inactive", Some(now - Duration::days(2)), false));
        let sweeper = ExpirationSweeper::new(&store);

        assert_eq!(sweeper.sweep(now).await.unwrap(), 1);
        assert_eq!(sweeper.sweep(now).await.unwrap(), 0);

        let active: Vec<_> = store
            .coupons()
            .into_iter()
            .filter(|c| c.is_active)
            .map(|c| c.coupon_name)
            .collect();
        assert_eq!(active, ["future", "open-ended"]);
    }

    #[tokio::test]
    async fn expiry_equal_to_now_stays_active() {
        let now = Utc::now();
        let store = MemoryStore::new();
        store.seed_coupon(coupon("edge", Some(now), true));

        assert_eq!(ExpirationSweeper::new(&store).sweep(now).await.unwrap(), 0);
    }
}
