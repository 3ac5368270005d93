use super::*;
use crate::page::memory::MemoryPageClient;
use crate::page::WaitCondition;

const BASE: &str = "https://shop.example";
const PANEL_URL: &str = "https://shop.example/store/coupon/panel?goodsNo=A0001";

fn config() -> CouponScrapeConfig {
    CouponScrapeConfig {
        base_url: BASE.to_owned(),
        navigation: NavigationPolicy {
            wait: WaitCondition::NetworkIdle,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_delay: Duration::ZERO,
        },
        settle_delay: Duration::ZERO,
        percent_threshold: 100,
    }
}

fn detail_page(with_button: bool) -> String {
    let button = if with_button {
        r#"<button data-qa-name="button-product-coupon-download" data-href="/store/coupon/panel?goodsNo=A0001">쿠폰받기</button>"#
    } else {
        ""
    };
    format!("<html><body><h1>상품</h1>{button}</body></html>")
}

fn entry(name: &str, discount: &str, condition: &str) -> String {
    format!(
        r#"<div class="left">
             <div class="name"><p class="css-14v0v12">{name}</p></div>
             <div class="discount-price"><span class="css-1b773zs">{discount}</span></div>
             <div class="description"><span>온라인</span><p class="css-1lh420">{condition}</p></div>
           </div>"#
    )
}

fn panel(entries: &[String]) -> String {
    format!("<div class=\"coupon-panel\">{}</div>", entries.concat())
}

async fn single_entry(html: &str) -> crate::page::HtmlNode {
    let url = format!("{BASE}/panel");
    let mut client = MemoryPageClient::new().with_page(&url, format!("<html><body>{html}</body></html>"));
    client
        .navigate(&url, WaitCondition::Load, Duration::from_secs(1))
        .await
        .unwrap();
    client.query(selectors::COUPON_ENTRY).unwrap().unwrap()
}

#[tokio::test]
async fn fixed_amount_entry_with_minimum_purchase() {
    let node = single_entry(&entry("메디힐 브랜드 할인 쿠폰", "1,000", "35,000원 이상 구매 시")).await;

    let coupon = parse_coupon_entry(&node, "메디힐", 100).unwrap();
    assert_eq!(coupon.brand, "메디힐");
    assert_eq!(coupon.coupon_name, "메디힐 브랜드 할인 쿠폰");
    assert_eq!(coupon.discount_type, DiscountType::Fixed);
    assert_eq!(coupon.discount_value, 1_000);
    assert_eq!(coupon.min_purchase, Some(35_000));
    assert!(coupon.max_discount.is_none());
    assert!(coupon.expires_at.is_none());
    assert!(coupon.is_active);
}

#[tokio::test]
async fn small_value_is_a_percentage() {
    let node = single_entry(&entry("10% 할인", "10", "조건 없음")).await;

    let coupon = parse_coupon_entry(&node, "라운드랩", 100).unwrap();
    assert_eq!(coupon.discount_type, DiscountType::Percent);
    assert_eq!(coupon.discount_value, 10);
    assert_eq!(coupon.min_purchase, None);
}

#[tokio::test]
async fn threshold_is_inclusive_and_configurable() {
    let node = single_entry(&entry("100원 할인", "100", "")).await;

    assert_eq!(
        parse_coupon_entry(&node, "b", 100).unwrap().discount_type,
        DiscountType::Percent
    );
    assert_eq!(
        parse_coupon_entry(&node, "b", 50).unwrap().discount_type,
        DiscountType::Fixed
    );
}

#[tokio::test]
async fn nameless_entry_is_skipped() {
    let node = single_entry(&entry("   ", "1,000", "")).await;
    assert_eq!(parse_coupon_entry(&node, "b", 100), Err(CouponSkip::MissingName));
}

#[tokio::test]
async fn missing_discount_is_zero_percent() {
    let node = single_entry(r#"<div class="left"><div class="name"><p>무료배송</p></div></div>"#).await;

    let coupon = parse_coupon_entry(&node, "b", 100).unwrap();
    assert_eq!(coupon.discount_value, 0);
    assert_eq!(coupon.discount_type, DiscountType::Percent);
}

#[tokio::test]
async fn opens_panel_and_reads_every_entry() {
    let product = site::product_url(BASE, "A0001");
    let mut client = MemoryPageClient::new()
        .with_page(&product, detail_page(true))
        .with_page(
            PANEL_URL,
            panel(&[
                entry("브랜드 쿠폰", "2,000", "20,000원 이상 구매 시"),
                entry("", "5", ""),
                entry("첫 구매 쿠폰", "15", "3만원 이상"),
            ]),
        );

    let found = scrape_brand_coupons(&mut client, &config(), "메디힐", "A0001")
        .await
        .unwrap();

    assert!(found.had_disclosure);
    assert_eq!(found.skipped_entries, 1);
    let names: Vec<&str> = found.coupons.iter().map(|c| c.coupon_name.as_str()).collect();
    assert_eq!(names, ["브랜드 쿠폰", "첫 구매 쿠폰"]);
    assert_eq!(found.coupons[1].min_purchase, Some(30_000));
    assert_eq!(client.clicks(), 1);
    assert_eq!(client.dismissals(), 1);
    assert!(client.query(selectors::COUPON_ENTRY).unwrap().is_none());
}

#[tokio::test]
async fn page_without_button_has_no_coupons() {
    let product = site::product_url(BASE, "A0002");
    let mut client = MemoryPageClient::new().with_page(&product, detail_page(false));

    let found = scrape_brand_coupons(&mut client, &config(), "라운드랩", "A0002")
        .await
        .unwrap();

    assert!(!found.had_disclosure);
    assert!(found.coupons.is_empty());
    assert_eq!(client.clicks(), 0);
    assert_eq!(client.dismissals(), 0);
}

#[tokio::test]
async fn unreachable_product_page_is_an_error() {
    let product = site::product_url(BASE, "A0003");
    let mut client = MemoryPageClient::new()
        .with_page(&product, detail_page(true))
        .fail_next(&product, 3);

    let err = scrape_brand_coupons(&mut client, &config(), "b", "A0003")
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(client.navigations().len(), 3);
}
