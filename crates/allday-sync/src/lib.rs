//! Catalog synchronization: reconciling listings against the store, brand
//! coupon collection, expiry sweeps, and the run pipeline tying them together.

pub mod brands;
pub mod coupons;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod sweep;

#[cfg(test)]
pub(crate) mod testing;

pub use brands::BrandIndex;
pub use coupons::{BrandCouponOutcome, CouponCollection, CouponCollector};
pub use error::SyncError;
pub use pipeline::{dry_run, CrawlPipeline, CrawlSettings};
pub use reconcile::{
    BatchOutcome, IdCache, ReconcileOutcome, ReconcileStats, ReconciliationEngine, SkippedRecord,
    WriteStage,
};
pub use report::{CategoryReport, CrawlReport, ReconcileFailure};
pub use sweep::ExpirationSweeper;
