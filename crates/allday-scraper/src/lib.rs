//! Page-level scraping for the ranking site: listing pagination, product
//! card extraction, coupon panels, and the price text parsers they share.

pub mod coupon;
pub mod error;
pub mod extract;
pub mod listing;
pub mod page;
pub mod politeness;
pub mod price;
pub mod retry;
pub mod selectors;

pub use coupon::{
    parse_coupon_entry, scrape_brand_coupons, BrandCoupons, CouponScrapeConfig, CouponSkip,
};
pub use error::ScraperError;
pub use extract::{extract_record, ItemSkip};
pub use listing::{ListingCollector, ListingConfig, ListingOutcome, StopReason, MAX_PAGES};
pub use page::http::HttpPageClient;
pub use page::{HtmlNode, PageClient, PageNode, WaitCondition};
pub use politeness::DelayRange;
pub use price::{discount_rate, parse_amount, parse_min_purchase, price_fields, PriceFields};
pub use retry::{navigate_with_retry, NavigationPolicy};
