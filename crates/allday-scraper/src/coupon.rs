//! Coupon discovery on a product detail page.
//!
//! A brand's coupons are listed in a panel that only opens after activating
//! the coupon-download button, so each visit is navigate, click, read, and
//! dismiss.

use std::fmt;
use std::time::Duration;

use allday_core::{site, CouponRecord, DiscountType};

use crate::error::ScraperError;
use crate::page::{PageClient, PageNode};
use crate::price::{parse_amount, parse_min_purchase};
use crate::retry::{navigate_with_retry, NavigationPolicy};
use crate::selectors;

#[derive(Debug, Clone)]
pub struct CouponScrapeConfig {
    pub base_url: String,
    pub navigation: NavigationPolicy,
    /// Pause after navigation and after opening the panel, letting scripted
    /// content settle.
    pub settle_delay: Duration,
    /// Discount values at or below this are read as percentages.
    pub percent_threshold: i64,
}

/// Why a panel entry produced no coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponSkip {
    MissingName,
    Malformed(String),
}

impl fmt::Display for CouponSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => f.write_str("coupon entry has no name"),
            Self::Malformed(reason) => write!(f, "malformed coupon entry: {reason}"),
        }
    }
}

impl From<ScraperError> for CouponSkip {
    fn from(err: ScraperError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Coupons read from one brand's representative product.
#[derive(Debug, Clone, Default)]
pub struct BrandCoupons {
    pub coupons: Vec<CouponRecord>,
    pub skipped_entries: usize,
    /// Whether the product page offered a coupon panel at all.
    pub had_disclosure: bool,
}

fn entry_text<N: PageNode>(entry: &N, selector: &str) -> Result<Option<String>, ScraperError> {
    Ok(entry
        .query(selector)?
        .map(|node| node.text().trim().to_owned()))
}

/// Parse one coupon panel entry for `brand`.
///
/// The discount amount is classified by `percent_threshold`; expiry and the
/// discount cap are never shown on this surface and stay unset.
///
/// # Errors
///
/// Returns a [`CouponSkip`] for entries without a name or with a broken
/// structure.
pub fn parse_coupon_entry<N: PageNode>(
    entry: &N,
    brand: &str,
    percent_threshold: i64,
) -> Result<CouponRecord, CouponSkip> {
    let coupon_name = entry_text(entry, selectors::COUPON_NAME)?
        .filter(|name| !name.is_empty())
        .ok_or(CouponSkip::MissingName)?;
    let discount_value = entry_text(entry, selectors::COUPON_DISCOUNT)?
        .map_or(0, |text| parse_amount(&text));
    let min_purchase = entry_text(entry, selectors::COUPON_CONDITION)?
        .and_then(|text| parse_min_purchase(&text));

    Ok(CouponRecord {
        brand: brand.to_owned(),
        coupon_name,
        discount_type: DiscountType::classify(discount_value, percent_threshold),
        discount_value,
        min_purchase,
        max_discount: None,
        expires_at: None,
        is_active: true,
    })
}

async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Visit `external_id`'s detail page and read every coupon offered to `brand`.
///
/// A page without the coupon button has no coupons. A failure to dismiss the
/// panel afterwards is only logged; the next navigation discards it anyway.
///
/// # Errors
///
/// Returns the navigation error if the product page cannot be loaded, or a
/// page-level error if opening or reading the panel fails.
pub async fn scrape_brand_coupons<P: PageClient>(
    client: &mut P,
    config: &CouponScrapeConfig,
    brand: &str,
    external_id: &str,
) -> Result<BrandCoupons, ScraperError> {
    let url = site::product_url(&config.base_url, external_id);
    navigate_with_retry(client, &url, config.navigation).await?;
    settle(config.settle_delay).await;

    let Some(button) = client.query(selectors::COUPON_BUTTON)? else {
        tracing::debug!(brand, external_id, "no coupon button");
        return Ok(BrandCoupons::default());
    };

    client.click(&button).await?;
    settle(config.settle_delay).await;
    if !client
        .wait_for(selectors::COUPON_ENTRY, config.navigation.timeout)
        .await?
    {
        tracing::debug!(brand, external_id, "coupon panel opened without entries");
    }

    let mut result = BrandCoupons {
        had_disclosure: true,
        ..BrandCoupons::default()
    };
    for entry in client.query_all(selectors::COUPON_ENTRY)? {
        match parse_coupon_entry(&entry, brand, config.percent_threshold) {
            Ok(coupon) => {
                tracing::debug!(
                    brand,
                    coupon = %coupon.coupon_name,
                    value = coupon.discount_value,
                    discount_type = %coupon.discount_type,
                    threshold = config.percent_threshold,
                    "coupon classified by value threshold"
                );
                result.coupons.push(coupon);
            }
            Err(skip) => {
                tracing::debug!(brand, reason = %skip, "coupon entry skipped");
                result.skipped_entries += 1;
            }
        }
    }

    if let Err(e) = client.dismiss_overlay().await {
        tracing::warn!(brand, error = %e, "failed to dismiss coupon panel");
    }

    if !result.coupons.is_empty() {
        tracing::info!(brand, coupons = result.coupons.len(), "coupons found");
    }
    Ok(result)
}

#[cfg(test)]
#[path = "coupon_test.rs"]
mod tests;
