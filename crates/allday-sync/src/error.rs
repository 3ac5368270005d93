use allday_core::StoreError;
use allday_scraper::ScraperError;
use thiserror::Error;

/// Conditions that abort a run before any work begins. Everything after
/// warm-up degrades to a reported partial outcome instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("rendering session could not be established: {0}")]
    Session(#[source] ScraperError),

    #[error("catalog store unavailable: {0}")]
    Store(#[source] StoreError),
}
