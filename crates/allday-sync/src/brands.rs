use allday_core::ProductRecord;

/// Distinct brands seen during a run, each with the first product observed
/// for it. That product's detail page is where the brand's coupons are read.
#[derive(Debug, Clone, Default)]
pub struct BrandIndex {
    brands: Vec<(String, String)>,
}

impl BrandIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `record`'s brand unless it is empty or already known.
    pub fn observe(&mut self, record: &ProductRecord) {
        let brand = record.brand.trim();
        if brand.is_empty() || self.brands.iter().any(|(b, _)| b == brand) {
            return;
        }
        self.brands
            .push((brand.to_owned(), record.external_id.clone()));
    }

    pub fn observe_all<'r>(&mut self, records: impl IntoIterator<Item = &'r ProductRecord>) {
        for record in records {
            self.observe(record);
        }
    }

    /// `(brand, representative external_id)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.brands.iter().map(|(b, id)| (b.as_str(), id.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}
