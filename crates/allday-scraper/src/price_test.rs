use super::*;

// -----------------------------------------------------------------------
// parse_amount
// -----------------------------------------------------------------------

#[test]
fn amount_strips_separators_and_currency() {
    assert_eq!(parse_amount("35,000원"), 35_000);
}

#[test]
fn amount_empty_is_zero() {
    assert_eq!(parse_amount(""), 0);
}

#[test]
fn amount_without_digits_is_zero() {
    assert_eq!(parse_amount("무료"), 0);
}

#[test]
fn amount_ignores_surrounding_whitespace() {
    assert_eq!(parse_amount("\n  12,900 \t"), 12_900);
}

#[test]
fn amount_saturates_instead_of_overflowing() {
    assert_eq!(parse_amount("99999999999999999999999"), i64::MAX);
}

// -----------------------------------------------------------------------
// parse_min_purchase
// -----------------------------------------------------------------------

#[test]
fn min_purchase_grouped_won() {
    assert_eq!(parse_min_purchase("35,000원 이상 구매 시"), Some(35_000));
}

#[test]
fn min_purchase_man_won() {
    assert_eq!(parse_min_purchase("3만원 이상"), Some(30_000));
}

#[test]
fn min_purchase_man_won_with_spaces() {
    assert_eq!(parse_min_purchase("2 만 원 이상 구매"), Some(20_000));
}

#[test]
fn min_purchase_without_condition_is_none() {
    assert_eq!(parse_min_purchase("조건 없음"), None);
}

#[test]
fn min_purchase_empty_is_none() {
    assert_eq!(parse_min_purchase(""), None);
}

#[test]
fn min_purchase_requires_or_more_phrase() {
    assert_eq!(parse_min_purchase("35,000원 할인"), None);
}

#[test]
fn min_purchase_comma_only_group_is_none() {
    assert_eq!(parse_min_purchase(",원 이상"), None);
}

// -----------------------------------------------------------------------
// discount_rate / price_fields
// -----------------------------------------------------------------------

#[test]
fn discount_rate_truncates() {
    // 1 - 6650/9500 = 0.3 exactly; 1 - 9990/15000 = 0.334
    assert_eq!(discount_rate(6_650, 9_500), 30);
    assert_eq!(discount_rate(9_990, 15_000), 33);
}

#[test]
fn discount_rate_is_zero_without_original_price() {
    assert_eq!(discount_rate(10_000, 0), 0);
}

#[test]
fn discount_rate_is_zero_when_not_discounted() {
    assert_eq!(discount_rate(10_000, 10_000), 0);
}

#[test]
fn discount_rate_is_zero_without_current_price() {
    assert_eq!(discount_rate(0, 18_000), 0);
    assert_eq!(discount_rate(-1, 18_000), 0);
}

#[test]
fn price_fields_missing_current_price_keeps_original() {
    let fields = price_fields(0, Some(18_000));
    assert_eq!(
        fields,
        PriceFields {
            price: 0,
            original_price: 18_000,
            discount_rate: 0,
            is_on_sale: true,
        }
    );
}

#[test]
fn discount_rate_never_negative() {
    assert_eq!(discount_rate(12_000, 10_000), 0);
}

#[test]
fn discount_rate_matches_floor_formula_across_range() {
    for original in [1_i64, 7, 99, 1_000, 15_900, 38_000] {
        for price in 1..=original.min(500) {
            let rate = discount_rate(price, original);
            assert!((0..=100).contains(&rate));
            let expected = ((original - price) * 100) / original;
            assert_eq!(i64::from(rate), expected, "price={price} original={original}");
        }
    }
}

#[test]
fn price_fields_with_original_is_on_sale() {
    let fields = price_fields(13_500, Some(18_000));
    assert_eq!(
        fields,
        PriceFields {
            price: 13_500,
            original_price: 18_000,
            discount_rate: 25,
            is_on_sale: true,
        }
    );
}

#[test]
fn price_fields_without_original_copies_price() {
    let fields = price_fields(22_000, None);
    assert_eq!(fields.original_price, 22_000);
    assert_eq!(fields.discount_rate, 0);
    assert!(!fields.is_on_sale);
}
