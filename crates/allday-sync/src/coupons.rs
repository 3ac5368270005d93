//! Per-brand coupon collection and persistence.

use allday_core::{CatalogStore, CouponRecord};
use allday_scraper::{scrape_brand_coupons, CouponScrapeConfig, DelayRange, PageClient};
use serde::Serialize;

use crate::brands::BrandIndex;

/// What happened for one brand's visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandCouponOutcome {
    pub brand: String,
    pub external_id: String,
    /// Coupons parsed from the panel.
    pub found: usize,
    pub new_coupons: usize,
    pub refreshed_coupons: usize,
    pub skipped_entries: usize,
    pub persistence_failures: usize,
    /// Set when the visit itself was abandoned.
    pub error: Option<String>,
}

impl BrandCouponOutcome {
    /// Coupons written to the store.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.new_coupons + self.refreshed_coupons
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CouponCollection {
    pub brands: Vec<BrandCouponOutcome>,
}

impl CouponCollection {
    /// Total coupons saved across every brand.
    #[must_use]
    pub fn total(&self) -> usize {
        self.brands.iter().map(BrandCouponOutcome::saved).sum()
    }

    #[must_use]
    pub fn new_coupons(&self) -> usize {
        self.brands.iter().map(|b| b.new_coupons).sum()
    }

    #[must_use]
    pub fn refreshed_coupons(&self) -> usize {
        self.brands.iter().map(|b| b.refreshed_coupons).sum()
    }

    #[must_use]
    pub fn persistence_failures(&self) -> usize {
        self.brands.iter().map(|b| b.persistence_failures).sum()
    }

    #[must_use]
    pub fn brands_failed(&self) -> usize {
        self.brands.iter().filter(|b| b.error.is_some()).count()
    }
}

pub struct CouponCollector<'a, P, S> {
    client: &'a mut P,
    store: &'a S,
    config: &'a CouponScrapeConfig,
    delay: DelayRange,
}

impl<'a, P: PageClient, S: CatalogStore> CouponCollector<'a, P, S> {
    pub fn new(
        client: &'a mut P,
        store: &'a S,
        config: &'a CouponScrapeConfig,
        delay: DelayRange,
    ) -> Self {
        Self {
            client,
            store,
            config,
            delay,
        }
    }

    /// Visit each brand's representative product in order and upsert every
    /// coupon found. A brand that cannot be visited is recorded and skipped.
    pub async fn collect(&mut self, brands: &BrandIndex) -> CouponCollection {
        let mut collection = CouponCollection::default();

        for (brand, external_id) in brands.iter() {
            let mut outcome = BrandCouponOutcome {
                brand: brand.to_owned(),
                external_id: external_id.to_owned(),
                ..BrandCouponOutcome::default()
            };

            match scrape_brand_coupons(&mut *self.client, self.config, brand, external_id).await {
                Ok(found) => {
                    outcome.found = found.coupons.len();
                    outcome.skipped_entries = found.skipped_entries;
                    for coupon in &found.coupons {
                        self.save(coupon, &mut outcome).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(brand, external_id, error = %e, "coupon visit abandoned");
                    outcome.error = Some(e.to_string());
                }
            }

            collection.brands.push(outcome);
            self.delay.pause().await;
        }

        tracing::info!(
            brands = collection.brands.len(),
            coupons = collection.total(),
            failed = collection.brands_failed(),
            "coupon collection finished"
        );
        collection
    }

    async fn save(&self, coupon: &CouponRecord, outcome: &mut BrandCouponOutcome) {
        let existed = match self
            .store
            .find_coupon(&coupon.brand, &coupon.coupon_name)
            .await
        {
            Ok(existing) => existing.is_some(),
            Err(e) => {
                tracing::error!(brand = %coupon.brand, coupon = %coupon.coupon_name, error = %e, "coupon lookup failed");
                outcome.persistence_failures += 1;
                return;
            }
        };

        match self.store.upsert_coupon(coupon).await {
            Ok(_) if existed => outcome.refreshed_coupons += 1,
            Ok(_) => outcome.new_coupons += 1,
            Err(e) => {
                tracing::error!(brand = %coupon.brand, coupon = %coupon.coupon_name, error = %e, "coupon upsert failed");
                outcome.persistence_failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::time::Duration;

    use allday_core::{site, DiscountType};
    use allday_scraper::page::memory::MemoryPageClient;
    use allday_scraper::{NavigationPolicy, WaitCondition};

    use super::*;
    use crate::testing::{record, MemoryStore};

    const BASE: &str = "https://shop.example";

    fn config() -> CouponScrapeConfig {
        CouponScrapeConfig {
            base_url: BASE.to_owned(),
            navigation: NavigationPolicy {
                wait: WaitCondition::NetworkIdle,
                timeout: Duration::from_secs(30),
                max_retries: 1,
                retry_delay: Duration::ZERO,
            },
            settle_delay: Duration::ZERO,
            percent_threshold: 100,
        }
    }

    fn detail_with_panel(id: &str) -> String {
        format!(
            r#"<html><body><button data-qa-name="button-product-coupon-download" data-href="/panel/{id}">쿠폰</button></body></html>"#
        )
    }

    fn panel(entries: &[(&str, &str)]) -> String {
        let mut html = String::from("<div>");
        for (name, discount) in entries {
            write!(
                html,
                r#"<div class="left"><div class="name"><p>{name}</p></div><div class="discount-price"><span>{discount}</span></div></div>"#
            )
            .unwrap();
        }
        html.push_str("</div>");
        html
    }

    fn brands(pairs: &[(&str, &str)]) -> BrandIndex {
        let mut index = BrandIndex::new();
        for (id, brand) in pairs {
            index.observe(&record(id, brand, "스킨케어"));
        }
        index
    }

    #[tokio::test]
    async fn counts_new_and_refreshed_coupons() {
        let mut client = MemoryPageClient::new()
            .with_page(site::product_url(BASE, "A1"), detail_with_panel("A1"))
            .with_page(format!("{BASE}/panel/A1"), panel(&[("신규", "10"), ("기존", "1,000")]));
        let store = MemoryStore::new();
        store.seed_coupon(CouponRecord {
            brand: "메디힐".to_owned(),
            coupon_name: "기존".to_owned(),
            discount_type: DiscountType::Fixed,
            discount_value: 500,
            min_purchase: None,
            max_discount: None,
            expires_at: None,
            is_active: false,
        });
        let cfg = config();

        let collection = CouponCollector::new(&mut client, &store, &cfg, DelayRange::ZERO)
            .collect(&brands(&[("A1", "메디힐")]))
            .await;

        assert_eq!(collection.total(), 2);
        assert_eq!(collection.new_coupons(), 1);
        assert_eq!(collection.refreshed_coupons(), 1);
        let stored = store.coupons();
        let refreshed = stored.iter().find(|c| c.coupon_name == "기존").unwrap();
        assert!(refreshed.is_active);
        assert_eq!(refreshed.discount_value, 1_000);
        let fresh = stored.iter().find(|c| c.coupon_name == "신규").unwrap();
        assert_eq!(fresh.discount_type, DiscountType::Percent);
    }

    #[tokio::test]
    async fn brand_without_button_has_no_coupons() {
        let mut client = MemoryPageClient::new().with_page(
            site::product_url(BASE, "A1"),
            "<html><body><h1>상품</h1></body></html>",
        );
        let store = MemoryStore::new();
        let cfg = config();

        let collection = CouponCollector::new(&mut client, &store, &cfg, DelayRange::ZERO)
            .collect(&brands(&[("A1", "메디힐")]))
            .await;

        assert_eq!(collection.total(), 0);
        assert_eq!(collection.brands_failed(), 0);
        assert!(collection.brands[0].error.is_none());
    }

    #[tokio::test]
    async fn failed_visit_does_not_stop_later_brands() {
        let mut client = MemoryPageClient::new()
            .with_page(site::product_url(BASE, "B1"), detail_with_panel("B1"))
            .with_page(format!("{BASE}/panel/B1"), panel(&[("쿠폰", "5")]));
        let store = MemoryStore::new();
        let cfg = config();

        let collection = CouponCollector::new(&mut client, &store, &cfg, DelayRange::ZERO)
            .collect(&brands(&[("A1", "없는브랜드"), ("B1", "라운드랩")]))
            .await;

        assert_eq!(collection.brands_failed(), 1);
        assert!(collection.brands[0].error.is_some());
        assert_eq!(collection.brands[1].saved(), 1);
        assert_eq!(collection.total(), 1);
        // One initial attempt plus one retry for the missing page.
        assert_eq!(
            client
                .navigations()
                .iter()
                .filter(|u| u.ends_with("goodsNo=A1"))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn upsert_failure_is_counted_and_skipped() {
        let mut client = MemoryPageClient::new()
            .with_page(site::product_url(BASE, "A1"), detail_with_panel("A1"))
            .with_page(format!("{BASE}/panel/A1"), panel(&[("실패", "10"), ("성공", "20")]));
        let store = MemoryStore::new().fail_coupon("실패");
        let cfg = config();

        let collection = CouponCollector::new(&mut client, &store, &cfg, DelayRange::ZERO)
            .collect(&brands(&[("A1", "메디힐")]))
            .await;

        assert_eq!(collection.persistence_failures(), 1);
        assert_eq!(collection.total(), 1);
        assert_eq!(collection.brands[0].found, 2);
        assert_eq!(store.coupons().len(), 1);
    }
}
