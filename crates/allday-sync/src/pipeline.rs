//! The sequential crawl: warm-up, categories, coupons, sweep, statistics.
//!
//! One rendering session and one store drive the whole run. Only warm-up can
//! fail the run; every later failure is recorded in the [`CrawlReport`].

use std::time::Duration;

use allday_core::{site, AppConfig, CatalogStore, CategoryConfig, SyncMode};
use allday_scraper::{
    navigate_with_retry, CouponScrapeConfig, DelayRange, ListingCollector, ListingConfig,
    ListingOutcome, NavigationPolicy, PageClient, WaitCondition,
};
use chrono::Utc;

use crate::brands::BrandIndex;
use crate::coupons::CouponCollector;
use crate::error::SyncError;
use crate::reconcile::{IdCache, ReconcileStats, ReconciliationEngine};
use crate::report::{CategoryReport, CrawlReport, ReconcileFailure};
use crate::sweep::ExpirationSweeper;

/// Everything a run needs besides its client, store and category list.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Landing page visited once to establish the session.
    pub main_url: String,
    pub listing: ListingConfig,
    pub coupons: CouponScrapeConfig,
    /// Pause after each brand's coupon visit.
    pub brand_delay: DelayRange,
    /// Default per-category target, overridable per category.
    pub target_count: usize,
    pub mode: SyncMode,
}

impl CrawlSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let navigation = NavigationPolicy {
            wait: WaitCondition::NetworkIdle,
            timeout: Duration::from_secs(config.navigation_timeout_secs),
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        };
        let delay = DelayRange::from_millis(config.delay_min_ms, config.delay_max_ms);

        Self {
            main_url: site::main_url(&config.site_base_url),
            listing: ListingConfig {
                base_url: config.site_base_url.clone(),
                page_size: config.page_size,
                navigation,
                delay,
            },
            coupons: CouponScrapeConfig {
                base_url: config.site_base_url.clone(),
                navigation,
                settle_delay: Duration::from_millis(config.settle_delay_ms),
                percent_threshold: config.percent_threshold,
            },
            brand_delay: delay,
            target_count: config.target_count,
            mode: config.sync_mode,
        }
    }
}

async fn warm_up<P: PageClient>(
    client: &mut P,
    settings: &CrawlSettings,
) -> Result<(), SyncError> {
    navigate_with_retry(client, &settings.main_url, settings.listing.navigation)
        .await
        .map_err(SyncError::Session)?;
    tracing::debug!(url = %settings.main_url, "session established");
    Ok(())
}

async fn collect_category<P: PageClient>(
    client: &mut P,
    settings: &CrawlSettings,
    category: &CategoryConfig,
) -> ListingOutcome {
    let target = category.target_or(settings.target_count);
    tracing::info!(
        category = %category.name,
        code = %category.code,
        target,
        "collecting category"
    );
    ListingCollector::new(client, &settings.listing)
        .collect(category, target)
        .await
}

pub struct CrawlPipeline<'a, P, S> {
    client: &'a mut P,
    store: &'a S,
    settings: &'a CrawlSettings,
}

impl<'a, P: PageClient, S: CatalogStore> CrawlPipeline<'a, P, S> {
    pub fn new(client: &'a mut P, store: &'a S, settings: &'a CrawlSettings) -> Self {
        Self {
            client,
            store,
            settings,
        }
    }

    /// Crawl `categories` in order, then collect coupons for every brand seen,
    /// sweep expired coupons and read the store totals.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] only when the session or the store is unusable
    /// before any work begins.
    pub async fn run(&mut self, categories: &[CategoryConfig]) -> Result<CrawlReport, SyncError> {
        let started_at = Utc::now();
        let mode = self.settings.mode;

        warm_up(&mut *self.client, self.settings).await?;
        self.store.ping().await.map_err(SyncError::Store)?;
        let cache = IdCache::seed(self.store).await.map_err(SyncError::Store)?;
        tracing::info!(
            %mode,
            categories = categories.len(),
            known_products = cache.len(),
            "crawl started"
        );

        let mut report = CrawlReport::new(started_at, mode, false, categories.len());
        let mut engine = ReconciliationEngine::new(self.store, cache);
        let mut brands = BrandIndex::new();

        for category in categories {
            let listing = collect_category(&mut *self.client, self.settings, category).await;
            brands.observe_all(&listing.records);

            let batch = engine.reconcile_all(&listing.records, mode).await;
            let reconciled = batch.stats;
            report
                .reconcile_failures
                .extend(batch.skipped.into_iter().map(|skipped| ReconcileFailure {
                    external_id: skipped.external_id,
                    category: category.name.clone(),
                    stage: skipped.stage,
                    error: skipped.error,
                }));

            tracing::info!(
                category = %category.name,
                collected = listing.records.len(),
                new = reconciled.new_count,
                updated = reconciled.updated_count,
                failures = reconciled.failures,
                stop = listing.stop.as_str(),
                "category finished"
            );
            report.push_category(CategoryReport::new(&listing, reconciled));
        }

        self.collect_coupons(&brands, &mut report).await;

        match ExpirationSweeper::new(self.store).sweep(Utc::now()).await {
            Ok(deactivated) => report.coupons_deactivated = deactivated,
            Err(e) => {
                tracing::error!(error = %e, "expiration sweep failed");
                report.errors.push(format!("sweep: {e}"));
            }
        }

        match self.store.stats().await {
            Ok(stats) => report.stats = Some(stats),
            Err(e) => tracing::warn!(error = %e, "failed to read catalog stats"),
        }

        report.finish(Utc::now());
        tracing::info!(
            duration_ms = report.duration_ms,
            new_products = report.new_products,
            updated_products = report.updated_products,
            coupons = report.coupons_collected,
            deactivated = report.coupons_deactivated,
            persistence_failures = report.persistence_failures,
            "crawl finished"
        );
        Ok(report)
    }

    async fn collect_coupons(&mut self, brands: &BrandIndex, report: &mut CrawlReport) {
        let collection = CouponCollector::new(
            &mut *self.client,
            self.store,
            &self.settings.coupons,
            self.settings.brand_delay,
        )
        .collect(brands)
        .await;

        report.brands_visited = collection.brands.len();
        report.brands_failed = collection.brands_failed();
        report.coupons_collected = collection.total();
        report.new_coupons = collection.new_coupons();
        report.refreshed_coupons = collection.refreshed_coupons();
        report.persistence_failures += collection.persistence_failures();
        for brand in &collection.brands {
            if let Some(error) = &brand.error {
                report.errors.push(format!("coupons for {}: {error}", brand.brand));
            }
        }
    }
}

/// Collect and parse listings without touching any store.
///
/// # Errors
///
/// Returns [`SyncError::Session`] if the landing page cannot be loaded.
pub async fn dry_run<P: PageClient>(
    client: &mut P,
    settings: &CrawlSettings,
    categories: &[CategoryConfig],
) -> Result<CrawlReport, SyncError> {
    let mut report = CrawlReport::new(Utc::now(), settings.mode, true, categories.len());
    warm_up(client, settings).await?;

    for category in categories {
        let listing = collect_category(client, settings, category).await;
        for record in &listing.records {
            tracing::debug!(
                category = %category.name,
                external_id = %record.external_id,
                name = %record.name,
                price = record.price,
                "parsed listing record"
            );
        }
        report.push_category(CategoryReport::new(&listing, ReconcileStats::default()));
    }

    report.finish(Utc::now());
    tracing::info!(
        products = report.products_collected,
        abandoned_pages = report.abandoned_pages,
        "dry run finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
