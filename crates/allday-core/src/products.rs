use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One product as observed on a ranking page, before reconciliation.
///
/// Prices are whole currency units. When `is_on_sale` is set the listing
/// showed a separate original price; otherwise `original_price == price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Site-assigned product identifier (the `goodsNo` query value).
    pub external_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub image_url: Option<String>,
    pub product_url: String,
    pub price: i64,
    pub original_price: i64,
    /// Whole percent in `0..=100`, truncated.
    pub discount_rate: i32,
    pub is_on_sale: bool,
}

/// A persisted catalog row. `id` is assigned on first insert and never
/// changes; `external_id` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub image_url: Option<String>,
    pub product_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An append-only price point. The ordered sequence by `recorded_at` is a
/// product's price history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub id: i64,
    pub catalog_entry_id: i64,
    pub price: i64,
    pub original_price: i64,
    pub discount_rate: i32,
    pub is_on_sale: bool,
    pub recorded_at: DateTime<Utc>,
}

/// How existing catalog entries are treated during reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Append price observations only; catalog metadata is left untouched.
    #[default]
    PriceOnly,
    /// Also overwrite name, brand, category and URLs of existing entries.
    FullRefresh,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::PriceOnly => write!(f, "price-only"),
            SyncMode::FullRefresh => write!(f, "full-refresh"),
        }
    }
}

impl std::str::FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-only" | "price_only" => Ok(SyncMode::PriceOnly),
            "full-refresh" | "full_refresh" => Ok(SyncMode::FullRefresh),
            other => Err(format!(
                "unknown sync mode '{other}'; expected 'price-only' or 'full-refresh'"
            )),
        }
    }
}
