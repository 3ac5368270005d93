//! Text-to-number parsing for listing prices and coupon conditions.
//!
//! Everything here is pure and total: malformed input degrades to `0` or
//! `None`, never to an error.

use std::sync::LazyLock;

use regex::Regex;

/// `"35,000원 이상"`: a comma-grouped amount followed by won and "or more".
static WON_OR_MORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9,]+)\s*원\s*이상").expect("valid won-or-more regex"));

/// `"3만원 이상"`: an amount in units of ten thousand won, "or more".
static MAN_WON_OR_MORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*만\s*원\s*이상").expect("valid man-won-or-more regex")
});

const MAN: i64 = 10_000;

/// Extracts an integer from price-like text by keeping only ASCII digits.
///
/// `"35,000원"` → `35000`; text without digits (`""`, `"무료"`) → `0`.
/// Absurdly long digit runs saturate at `i64::MAX` rather than failing.
#[must_use]
pub fn parse_amount(text: &str) -> i64 {
    text.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d))
        })
}

/// Extracts the minimum purchase amount from a coupon condition sentence.
///
/// Recognizes `"35,000원 이상 구매 시"` (→ `35000`) and `"3만원 이상"`
/// (→ `30000`). Anything else, including `"조건 없음"`, yields `None`.
#[must_use]
pub fn parse_min_purchase(text: &str) -> Option<i64> {
    if let Some(caps) = WON_OR_MORE.captures(text) {
        let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
        if !digits.is_empty() {
            return digits.parse::<i64>().ok();
        }
    }

    let caps = MAN_WON_OR_MORE.captures(text)?;
    caps[1].parse::<i64>().ok()?.checked_mul(MAN)
}

/// Whole-percent discount of `price` against `original_price`, truncated.
///
/// `floor((1 - price / original_price) * 100)` computed in integers, so
/// `(7000, 10000)` is exactly `30`. Returns `0` unless both prices are
/// positive, so a missing current price never reads as a 100% discount.
/// Never leaves `0..=100`.
#[must_use]
pub fn discount_rate(price: i64, original_price: i64) -> i32 {
    if price <= 0 || original_price <= 0 {
        return 0;
    }
    let off = i128::from(original_price) - i128::from(price);
    let rate = (off * 100 / i128::from(original_price)).clamp(0, 100);
    i32::try_from(rate).unwrap_or(0)
}

/// Derived price fields of one listing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFields {
    pub price: i64,
    pub original_price: i64,
    pub discount_rate: i32,
    pub is_on_sale: bool,
}

/// Combine a current price with an optional struck-through original price.
///
/// A present original price marks the item as on sale; otherwise the
/// original price equals the current price.
#[must_use]
pub fn price_fields(price: i64, original_price: Option<i64>) -> PriceFields {
    let (original_price, is_on_sale) = match original_price {
        Some(original) => (original, true),
        None => (price, false),
    };
    PriceFields {
        price,
        original_price,
        discount_rate: discount_rate(price, original_price),
        is_on_sale,
    }
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
