//! End-of-run report.

use std::fmt;
use std::time::Duration;

use allday_core::{CatalogStats, SyncMode};
use allday_scraper::ListingOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::reconcile::{ReconcileStats, WriteStage};

/// One category's listing and reconciliation result.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: String,
    pub collected: usize,
    pub pages_fetched: u32,
    pub skipped_items: usize,
    pub stop_reason: &'static str,
    pub new_products: usize,
    pub updated_products: usize,
    pub persistence_failures: usize,
    pub error: Option<String>,
}

impl CategoryReport {
    #[must_use]
    pub fn new(listing: &ListingOutcome, reconciled: ReconcileStats) -> Self {
        Self {
            category: listing.category.clone(),
            collected: listing.records.len(),
            pages_fetched: listing.pages_fetched,
            skipped_items: listing.skipped_items,
            stop_reason: listing.stop.as_str(),
            new_products: reconciled.new_count,
            updated_products: reconciled.updated_count,
            persistence_failures: reconciled.failures,
            error: listing.error.clone(),
        }
    }
}

/// A record whose catalog write failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileFailure {
    pub external_id: String,
    pub category: String,
    pub stage: WriteStage,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub mode: SyncMode,
    pub dry_run: bool,
    pub categories_total: usize,
    pub categories_completed: usize,
    pub products_collected: usize,
    pub new_products: usize,
    pub updated_products: usize,
    pub brands_visited: usize,
    pub brands_failed: usize,
    pub coupons_collected: usize,
    pub new_coupons: usize,
    pub refreshed_coupons: usize,
    pub coupons_deactivated: u64,
    pub abandoned_pages: usize,
    pub skipped_items: usize,
    /// Catalog and coupon writes that failed.
    pub persistence_failures: usize,
    pub categories: Vec<CategoryReport>,
    pub reconcile_failures: Vec<ReconcileFailure>,
    pub errors: Vec<String>,
    /// Store totals after the run; absent for dry runs or if the query failed.
    pub stats: Option<CatalogStats>,
}

impl CrawlReport {
    #[must_use]
    pub fn new(
        started_at: DateTime<Utc>,
        mode: SyncMode,
        dry_run: bool,
        categories_total: usize,
    ) -> Self {
        Self {
            started_at,
            duration_ms: 0,
            mode,
            dry_run,
            categories_total,
            categories_completed: 0,
            products_collected: 0,
            new_products: 0,
            updated_products: 0,
            brands_visited: 0,
            brands_failed: 0,
            coupons_collected: 0,
            new_coupons: 0,
            refreshed_coupons: 0,
            coupons_deactivated: 0,
            abandoned_pages: 0,
            skipped_items: 0,
            persistence_failures: 0,
            categories: Vec::new(),
            reconcile_failures: Vec::new(),
            errors: Vec::new(),
            stats: None,
        }
    }

    /// Fold one category into the totals.
    pub fn push_category(&mut self, category: CategoryReport) {
        self.categories_completed += 1;
        self.products_collected += category.collected;
        self.new_products += category.new_products;
        self.updated_products += category.updated_products;
        self.skipped_items += category.skipped_items;
        self.persistence_failures += category.persistence_failures;
        if let Some(error) = &category.error {
            self.abandoned_pages += 1;
            self.errors.push(format!("{}: {error}", category.category));
        }
        self.categories.push(category);
    }

    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        let elapsed = (finished_at - self.started_at).num_milliseconds();
        self.duration_ms = u64::try_from(elapsed).unwrap_or(0);
    }

    /// Whether any unit of work was abandoned or any write failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty() || self.persistence_failures > 0 || self.brands_failed > 0
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.dry_run { "dry run" } else { "crawl" };
        writeln!(
            f,
            "{label} ({}) finished in {:.1}s",
            self.mode,
            Duration::from_millis(self.duration_ms).as_secs_f64()
        )?;
        writeln!(
            f,
            "  categories:           {}/{}",
            self.categories_completed, self.categories_total
        )?;
        writeln!(f, "  products collected:   {}", self.products_collected)?;
        if !self.dry_run {
            writeln!(f, "  new products:         {}", self.new_products)?;
            writeln!(f, "  updated products:     {}", self.updated_products)?;
            writeln!(
                f,
                "  coupons collected:    {} ({} new, {} brands)",
                self.coupons_collected, self.new_coupons, self.brands_visited
            )?;
            writeln!(f, "  coupons deactivated:  {}", self.coupons_deactivated)?;
            writeln!(f, "  persistence failures: {}", self.persistence_failures)?;
        }
        writeln!(f, "  abandoned pages:      {}", self.abandoned_pages)?;
        writeln!(f, "  skipped items:        {}", self.skipped_items)?;
        if let Some(stats) = self.stats {
            writeln!(
                f,
                "  catalog:              {} products, {} active coupons",
                stats.total_products, stats.active_coupons
            )?;
        }
        for error in &self.errors {
            writeln!(f, "  error: {error}")?;
        }
        Ok(())
    }
}
