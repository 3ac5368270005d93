//! Turns one ranking-grid card into a [`ProductRecord`].

use std::fmt;
use std::sync::LazyLock;

use allday_core::{site, ProductRecord};
use regex::Regex;

use crate::error::ScraperError;
use crate::page::PageNode;
use crate::price::{parse_amount, price_fields};
use crate::selectors;

/// Product identifier in a detail-page link, e.g. `goodsNo=A000000223414`.
static GOODS_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"goodsNo=(\w+)").expect("valid goodsNo regex"));

/// Why a listing item produced no record. Listings legitimately contain
/// decorations that are not products, so none of these is a run error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSkip {
    MissingLink,
    MissingHref,
    UnmatchedId { href: String },
    Malformed(String),
}

impl fmt::Display for ItemSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLink => f.write_str("item has no link"),
            Self::MissingHref => f.write_str("item link has no href"),
            Self::UnmatchedId { href } => write!(f, "no product id in link {href:?}"),
            Self::Malformed(reason) => write!(f, "malformed item: {reason}"),
        }
    }
}

impl From<ScraperError> for ItemSkip {
    fn from(err: ScraperError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Pull the product identifier out of a link target.
#[must_use]
pub fn external_id_from_href(href: &str) -> Option<&str> {
    GOODS_NO
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn trimmed_text<N: PageNode>(item: &N, selector: &str) -> Result<String, ScraperError> {
    Ok(item
        .query(selector)?
        .map(|node| node.text().trim().to_owned())
        .unwrap_or_default())
}

fn amount<N: PageNode>(item: &N, selector: &str) -> Result<Option<i64>, ScraperError> {
    Ok(item.query(selector)?.map(|node| parse_amount(&node.text())))
}

/// Extract one product card.
///
/// Missing brand or name text becomes an empty string and a missing image
/// becomes `None`; only an absent or unrecognizable product link drops the
/// item.
///
/// # Errors
///
/// Returns the [`ItemSkip`] reason when the item is not a usable product.
pub fn extract_record<N: PageNode>(
    item: &N,
    category: &str,
    base_url: &str,
) -> Result<ProductRecord, ItemSkip> {
    let link = item
        .query(selectors::ITEM_LINK)?
        .ok_or(ItemSkip::MissingLink)?;
    let href = link
        .attribute("href")
        .filter(|h| !h.is_empty())
        .ok_or(ItemSkip::MissingHref)?;
    let external_id = external_id_from_href(&href)
        .ok_or_else(|| ItemSkip::UnmatchedId { href: href.clone() })?
        .to_owned();

    let brand = trimmed_text(item, selectors::ITEM_BRAND)?;
    let name = trimmed_text(item, selectors::ITEM_NAME)?;
    let image_url = item
        .query(selectors::ITEM_IMAGE)?
        .and_then(|img| img.attribute("src"));

    let price = amount(item, selectors::ITEM_PRICE)?.unwrap_or(0);
    let prices = price_fields(price, amount(item, selectors::ITEM_ORIGINAL_PRICE)?);

    Ok(ProductRecord {
        product_url: site::product_url(base_url, &external_id),
        external_id,
        name,
        brand,
        category: category.to_owned(),
        image_url,
        price: prices.price,
        original_price: prices.original_price,
        discount_rate: prices.discount_rate,
        is_on_sale: prices.is_on_sale,
    })
}
