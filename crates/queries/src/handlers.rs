//! Query handlers over the product read model.

use std::sync::Arc;

use common::{AggregateId, Clock};
use store::{ActiveProductsQuery, ProductReadModel};

use crate::Result;
use crate::views::{ProductListView, ProductView};

/// Query for one product.
#[derive(Debug, Clone, Copy)]
pub struct GetProduct {
    pub product_id: AggregateId,
}

impl GetProduct {
    pub fn new(product_id: AggregateId) -> Self {
        Self { product_id }
    }
}

/// Query for a page of active products.
#[derive(Debug, Clone, Default)]
pub struct ListProducts {
    pub category: Option<String>,
    /// Zero or negative means the default page size.
    pub page_size: i64,
    pub page_token: Option<String>,
}

impl From<ListProducts> for ActiveProductsQuery {
    fn from(query: ListProducts) -> Self {
        let mut active = ActiveProductsQuery::new().page_size(query.page_size);
        if let Some(category) = query.category {
            active = active.category(category);
        }
        if let Some(token) = query.page_token {
            active = active.page_token(token);
        }
        active
    }
}

/// Answers product queries, pricing every product at the clock's current
/// instant.
#[derive(Clone)]
pub struct ProductQueries {
    read_model: Arc<dyn ProductReadModel>,
    clock: Arc<dyn Clock>,
}

impl ProductQueries {
    pub fn new(read_model: Arc<dyn ProductReadModel>, clock: Arc<dyn Clock>) -> Self {
        Self { read_model, clock }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, query: GetProduct) -> Result<ProductView> {
        let record = self.read_model.get_by_id(query.product_id).await?;
        ProductView::from_record(record, self.clock.now())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, query: ListProducts) -> Result<ProductListView> {
        let page = self.read_model.list_active(&query.into()).await?;
        tracing::debug!(returned = page.items.len(), "listed active products");
        ProductListView::from_page(page, self.clock.now())
    }
}
