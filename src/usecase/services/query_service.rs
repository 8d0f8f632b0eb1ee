use std::sync::Arc;

use crate::domain::entities::product::Product;
use crate::domain::entities::query::{Filters, ListParams, SortModel, SortSynonyms};
use crate::usecase::ports::fetcher::{FetchError, ListFetcher};

pub const PRODUCT_OPTION_LIMIT: u32 = 10;

/// Lookups feeding the product search box.
pub struct QueryService {
    products: Arc<dyn ListFetcher<Product>>,
}

impl QueryService {
    pub fn new(products: Arc<dyn ListFetcher<Product>>) -> Self {
        Self { products }
    }

    pub async fn search_products(&self, text: &str) -> Result<Vec<Product>, FetchError> {
        let mut filters = Filters::new();
        filters.insert("productName".to_string(), text.trim().to_string());
        let params = ListParams {
            page: 0,
            size: PRODUCT_OPTION_LIMIT,
            sort: Some(SortModel::asc("productName").to_wire(&SortSynonyms::none())),
            filters,
        };

        Ok(self.products.fetch(params).await?.content)
    }
}
