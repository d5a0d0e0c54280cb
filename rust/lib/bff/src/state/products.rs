use catalog_client::Product;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ListFilter {
    #[default]
    All,
    AvailableOnly,
}

/// The product table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListView {
    pub items: Vec<Product>,
    pub filter: ListFilter,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProductListView {
    pub const PATH: &'static str = "products/view";

    /// Rows to show for `mirror` under the current filter.
    pub fn rows_from(&self, mirror: &[Product]) -> Vec<Product> {
        match self.filter {
            ListFilter::All => mirror.to_vec(),
            ListFilter::AvailableOnly => mirror.iter().filter(|p| p.available).cloned().collect(),
        }
    }
}
