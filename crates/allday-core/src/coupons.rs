use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percent,
    Fixed,
}

impl DiscountType {
    /// Classify a coupon amount. Values at or below `percent_threshold` are
    /// read as percentages, larger values as fixed currency amounts.
    ///
    /// The coupon panel does not state the unit, so this is a heuristic: a
    /// fixed coupon worth `percent_threshold` or less is misread as a percent.
    #[must_use]
    pub fn classify(discount_value: i64, percent_threshold: i64) -> Self {
        if discount_value <= percent_threshold {
            DiscountType::Percent
        } else {
            DiscountType::Fixed
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percent => "percent",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percent" => Ok(DiscountType::Percent),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(format!("unknown discount type '{other}'")),
        }
    }
}

/// A brand coupon offer. Identity is `(brand, coupon_name)`; re-observing
/// an existing key overwrites the value fields and reactivates it.
///
/// `max_discount` and `expires_at` are never populated by the crawler
/// because the coupon panel does not expose them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponRecord {
    pub brand: String,
    pub coupon_name: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase: Option<i64>,
    pub max_discount: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl CouponRecord {
    /// Whether this coupon should be deactivated by a sweep at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_some_and(|at| at < now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn coupon(expires_at: Option<DateTime<Utc>>, is_active: bool) -> CouponRecord {
        CouponRecord {
            brand: "메디힐".to_string(),
            coupon_name: "브랜드 할인 쿠폰".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: 1000,
            min_purchase: Some(35_000),
            max_discount: None,
            expires_at,
            is_active,
        }
    }

    #[test]
    fn classify_small_values_as_percent() {
        assert_eq!(DiscountType::classify(10, 100), DiscountType::Percent);
    }

    #[test]
    fn classify_threshold_is_inclusive() {
        assert_eq!(DiscountType::classify(100, 100), DiscountType::Percent);
        assert_eq!(DiscountType::classify(101, 100), DiscountType::Fixed);
    }

    #[test]
    fn classify_large_values_as_fixed() {
        assert_eq!(DiscountType::classify(1000, 100), DiscountType::Fixed);
    }

    #[test]
    fn classify_honours_custom_threshold() {
        assert_eq!(DiscountType::classify(80, 50), DiscountType::Fixed);
    }

    #[test]
    fn discount_type_serializes_lowercase() {
        let json = serde_json::to_string(&DiscountType::Percent).unwrap();
        assert_eq!(json, "\"percent\"");
        assert_eq!("fixed".parse::<DiscountType>().unwrap(), DiscountType::Fixed);
    }

    #[test]
    fn expiry_requires_strictly_past_timestamp() {
        let now = Utc::now();
        assert!(coupon(Some(now - Duration::seconds(1)), true).is_expired_at(now));
        assert!(!coupon(Some(now), true).is_expired_at(now));
        assert!(!coupon(None, true).is_expired_at(now));
        assert!(!coupon(Some(now - Duration::days(1)), false).is_expired_at(now));
    }
}
