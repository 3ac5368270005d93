//! CSS selectors for the ranking listing and the product detail page.

/// One product card in the ranking grid.
pub const LISTING_ITEM: &str = ".prd_info";
/// The card's link to the product detail page.
pub const ITEM_LINK: &str = "a";
pub const ITEM_BRAND: &str = ".tx_brand";
pub const ITEM_NAME: &str = ".tx_name";
pub const ITEM_IMAGE: &str = "img";
/// Current (possibly discounted) price.
pub const ITEM_PRICE: &str = ".tx_cur .tx_num";
/// Struck-through original price; only present while on sale.
pub const ITEM_ORIGINAL_PRICE: &str = ".tx_org .tx_num";

/// Opens the coupon download panel on a product detail page.
pub const COUPON_BUTTON: &str = r#"button[data-qa-name="button-product-coupon-download"]"#;
/// One coupon entry inside the opened panel.
pub const COUPON_ENTRY: &str = ".left";
pub const COUPON_NAME: &str = ".name p";
pub const COUPON_DISCOUNT: &str = ".discount-price span";
/// Usage condition, e.g. the minimum purchase sentence.
pub const COUPON_CONDITION: &str = ".description p";
