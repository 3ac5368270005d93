//! Database operations for `coupons`.

use allday_core::{CouponRecord, DiscountType};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `coupons` table.
///
/// `discount_type` is constrained to `'percent'` or `'fixed'` by the schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CouponRow {
    pub id: i64,
    pub brand: String,
    pub coupon_name: String,
    pub discount_type: String,
    pub discount_value: i64,
    pub min_purchase: Option<i64>,
    pub max_discount: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for CouponRecord {
    type Error = DbError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let discount_type =
            row.discount_type
                .parse::<DiscountType>()
                .map_err(|_| DbError::InvalidColumn {
                    column: "coupons.discount_type",
                    value: row.discount_type.clone(),
                })?;
        Ok(Self {
            brand: row.brand,
            coupon_name: row.coupon_name,
            discount_type,
            discount_value: row.discount_value,
            min_purchase: row.min_purchase,
            max_discount: row.max_discount,
            expires_at: row.expires_at,
            is_active: row.is_active,
        })
    }
}

const COUPON_COLUMNS: &str = "id, brand, coupon_name, discount_type, discount_value, \
     min_purchase, max_discount, expires_at, is_active, created_at, updated_at";

/// Fetches the coupon identified by `(brand, coupon_name)`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_coupon(
    pool: &PgPool,
    brand: &str,
    coupon_name: &str,
) -> Result<Option<CouponRow>, DbError> {
    let row = sqlx::query_as::<_, CouponRow>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE brand = $1 AND coupon_name = $2"
    ))
    .bind(brand)
    .bind(coupon_name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Upserts a coupon.
///
/// Conflicts on `(brand, coupon_name)` overwrite every value field and
/// `updated_at`. The row is active afterwards regardless of its prior state.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_coupon(pool: &PgPool, coupon: &CouponRecord) -> Result<CouponRow, DbError> {
    let row = sqlx::query_as::<_, CouponRow>(&format!(
        "INSERT INTO coupons \
             (brand, coupon_name, discount_type, discount_value, min_purchase, \
              max_discount, expires_at, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE) \
         ON CONFLICT (brand, coupon_name) DO UPDATE SET \
             discount_type  = EXCLUDED.discount_type, \
             discount_value = EXCLUDED.discount_value, \
             min_purchase   = EXCLUDED.min_purchase, \
             max_discount   = EXCLUDED.max_discount, \
             expires_at     = EXCLUDED.expires_at, \
             is_active      = TRUE, \
             updated_at     = NOW() \
         RETURNING {COUPON_COLUMNS}"
    ))
    .bind(&coupon.brand)
    .bind(&coupon.coupon_name)
    .bind(coupon.discount_type.as_str())
    .bind(coupon.discount_value)
    .bind(coupon.min_purchase)
    .bind(coupon.max_discount)
    .bind(coupon.expires_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Sets `is_active = FALSE` on every active coupon with `expires_at < now`.
///
/// Returns the number of rows changed; coupons without an expiry are never
/// touched, so a second call with the same `now` returns 0.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn deactivate_expired_coupons(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE coupons \
         SET is_active = FALSE, updated_at = NOW() \
         WHERE is_active AND expires_at IS NOT NULL AND expires_at < $1",
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
