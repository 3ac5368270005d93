//! Database operations for `catalog_entries` and `price_observations`.

use std::collections::HashMap;

use allday_core::{CatalogEntry, PriceObservation, ProductRecord};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `catalog_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogEntryRow {
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

impl From<CatalogEntryRow> for CatalogEntry {
    fn from(row: CatalogEntryRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            brand: row.brand,
            category: row.category,
            image_url: row.image_url,
            product_url: row.product_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `price_observations` table. Rows are never updated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceObservationRow {
    pub id: i64,
    pub catalog_entry_id: i64,
    pub price: i64,
    pub original_price: i64,
    pub discount_rate: i32,
    pub is_on_sale: bool,
    pub recorded_at: DateTime<Utc>,
}

impl From<PriceObservationRow> for PriceObservation {
    fn from(row: PriceObservationRow) -> Self {
        Self {
            id: row.id,
            catalog_entry_id: row.catalog_entry_id,
            price: row.price,
            original_price: row.original_price,
            discount_rate: row.discount_rate,
            is_on_sale: row.is_on_sale,
            recorded_at: row.recorded_at,
        }
    }
}

// ---------------------------------------------------------------------------
// catalog_entries operations
// ---------------------------------------------------------------------------

/// Fetches the entry with the given natural key, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_catalog_entry(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<CatalogEntryRow>, DbError> {
    let row = sqlx::query_as::<_, CatalogEntryRow>(
        "SELECT id, external_id, name, brand, category, image_url, product_url, \
                created_at, updated_at \
         FROM catalog_entries \
         WHERE external_id = $1",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every `external_id` with its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_external_ids(pool: &PgPool) -> Result<HashMap<String, i64>, DbError> {
    let rows = sqlx::query_as::<_, (String, i64)>("SELECT external_id, id FROM catalog_entries")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Upserts a catalog entry.
///
/// Conflicts on `external_id` overwrite `name`, `brand`, `category`,
/// `image_url`, `product_url`, and `updated_at` in place; `id` and
/// `created_at` are preserved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_catalog_entry(
    pool: &PgPool,
    record: &ProductRecord,
) -> Result<CatalogEntryRow, DbError> {
    let row = sqlx::query_as::<_, CatalogEntryRow>(
        "INSERT INTO catalog_entries \
             (external_id, name, brand, category, image_url, product_url) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (external_id) DO UPDATE SET \
             name        = EXCLUDED.name, \
             brand       = EXCLUDED.brand, \
             category    = EXCLUDED.category, \
             image_url   = EXCLUDED.image_url, \
             product_url = EXCLUDED.product_url, \
             updated_at  = NOW() \
         RETURNING id, external_id, name, brand, category, image_url, product_url, \
                   created_at, updated_at",
    )
    .bind(&record.external_id)
    .bind(&record.name)
    .bind(&record.brand)
    .bind(&record.category)
    .bind(&record.image_url)
    .bind(&record.product_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// price_observations operations
// ---------------------------------------------------------------------------

/// Appends one price observation for `catalog_entry_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a foreign-key
/// violation for an unknown entry.
pub async fn append_price_observation(
    pool: &PgPool,
    catalog_entry_id: i64,
    price: i64,
    original_price: i64,
    discount_rate: i32,
    is_on_sale: bool,
) -> Result<PriceObservationRow, DbError> {
    let row = sqlx::query_as::<_, PriceObservationRow>(
        "INSERT INTO price_observations \
             (catalog_entry_id, price, original_price, discount_rate, is_on_sale) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, catalog_entry_id, price, original_price, discount_rate, \
                   is_on_sale, recorded_at",
    )
    .bind(catalog_entry_id)
    .bind(price)
    .bind(original_price)
    .bind(discount_rate)
    .bind(is_on_sale)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent observation for `catalog_entry_id`, if any.
///
/// Ties on `recorded_at` (same transaction timestamp) resolve to the higher
/// `id`, i.e. the later insert.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_price_observation(
    pool: &PgPool,
    catalog_entry_id: i64,
) -> Result<Option<PriceObservationRow>, DbError> {
    let row = sqlx::query_as::<_, PriceObservationRow>(
        "SELECT id, catalog_entry_id, price, original_price, discount_rate, \
                is_on_sale, recorded_at \
         FROM price_observations \
         WHERE catalog_entry_id = $1 \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(catalog_entry_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
