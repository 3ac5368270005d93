//! URL shapes of the ranking site.

/// Display category that hosts the ranking board; fixed for every category.
const RANKING_DISPLAY_CATEGORY: &str = "900000100100001";

/// Main landing page, used to warm up the session before a run.
#[must_use]
pub fn main_url(base_url: &str) -> String {
    format!("{base_url}/store/main/main.do")
}

/// Ranking page `page` (1-based) for `category_code`, `page_size` items per page.
#[must_use]
pub fn ranking_url(base_url: &str, category_code: &str, page: u32, page_size: usize) -> String {
    format!(
        "{base_url}/store/main/getBestList.do\
         ?dispCatNo={RANKING_DISPLAY_CATEGORY}\
         &fltDispCatNo={category_code}\
         &pageIdx={page}\
         &rowsPerPage={page_size}"
    )
}

/// Detail view for one product.
#[must_use]
pub fn product_url(base_url: &str, external_id: &str) -> String {
    format!("{base_url}/store/goods/getGoodsDetail.do?goodsNo={external_id}")
}
