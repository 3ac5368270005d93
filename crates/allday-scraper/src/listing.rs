//! Paginated collection of one category's ranking board.

use allday_core::{site, CategoryConfig, ProductRecord};

use crate::extract::extract_record;
use crate::page::PageClient;
use crate::politeness::DelayRange;
use crate::retry::{navigate_with_retry, NavigationPolicy};
use crate::selectors;

/// Upper bound on ranking pages visited per category.
///
/// The short-page check normally ends pagination long before this; the guard
/// only matters if the site keeps serving full pages indefinitely.
pub const MAX_PAGES: u32 = 200;

#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub base_url: String,
    /// Items requested per ranking page; a page with fewer items is the last.
    pub page_size: usize,
    pub navigation: NavigationPolicy,
    /// Pause after every successfully loaded page.
    pub delay: DelayRange,
}

/// Why pagination of a category ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    /// A page held fewer items than the page size, including none at all.
    ShortPage,
    /// A page could not be loaded or read; earlier records are kept.
    PageFailed,
    PageLimit,
}

impl StopReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TargetReached => "target_reached",
            Self::ShortPage => "short_page",
            Self::PageFailed => "page_failed",
            Self::PageLimit => "page_limit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingOutcome {
    pub category: String,
    pub records: Vec<ProductRecord>,
    pub pages_fetched: u32,
    /// Items on fetched pages that were not products (see [`crate::ItemSkip`]).
    pub skipped_items: usize,
    pub stop: StopReason,
    /// The failure behind [`StopReason::PageFailed`].
    pub error: Option<String>,
}

pub struct ListingCollector<'a, P: PageClient> {
    client: &'a mut P,
    config: &'a ListingConfig,
}

impl<'a, P: PageClient> ListingCollector<'a, P> {
    pub fn new(client: &'a mut P, config: &'a ListingConfig) -> Self {
        Self { client, config }
    }

    /// Collect up to `target` records from `category`, page by page.
    ///
    /// Never fails: a page that cannot be loaded after retries ends this
    /// category with whatever was gathered so far.
    pub async fn collect(&mut self, category: &CategoryConfig, target: usize) -> ListingOutcome {
        let mut outcome = ListingOutcome {
            category: category.name.clone(),
            records: Vec::with_capacity(target.min(1_000)),
            pages_fetched: 0,
            skipped_items: 0,
            stop: StopReason::TargetReached,
            error: None,
        };
        let mut page = 1u32;

        while outcome.records.len() < target {
            let url = site::ranking_url(
                &self.config.base_url,
                &category.code,
                page,
                self.config.page_size,
            );

            if let Err(e) = navigate_with_retry(&mut *self.client, &url, self.config.navigation).await {
                tracing::error!(
                    category = %category.name,
                    page,
                    error = %e,
                    "ranking page failed; ending category early"
                );
                outcome.stop = StopReason::PageFailed;
                outcome.error = Some(e.to_string());
                break;
            }
            self.config.delay.pause().await;

            let items = match self.client.query_all(selectors::LISTING_ITEM) {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!(category = %category.name, page, error = %e, "ranking page unreadable");
                    outcome.stop = StopReason::PageFailed;
                    outcome.error = Some(e.to_string());
                    break;
                }
            };
            outcome.pages_fetched += 1;

            for item in &items {
                if outcome.records.len() >= target {
                    break;
                }
                match extract_record(item, &category.name, &self.config.base_url) {
                    Ok(record) => outcome.records.push(record),
                    Err(skip) => {
                        tracing::debug!(category = %category.name, page, reason = %skip, "item skipped");
                        outcome.skipped_items += 1;
                    }
                }
            }

            tracing::info!(
                category = %category.name,
                page,
                items = items.len(),
                total = outcome.records.len(),
                "ranking page collected"
            );

            if outcome.records.len() >= target {
                outcome.stop = StopReason::TargetReached;
                break;
            }
            if items.len() < self.config.page_size {
                outcome.stop = StopReason::ShortPage;
                break;
            }
            if page >= MAX_PAGES {
                tracing::warn!(category = %category.name, max_pages = MAX_PAGES, "page limit reached");
                outcome.stop = StopReason::PageLimit;
                break;
            }
            page += 1;
        }

        outcome
    }
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
