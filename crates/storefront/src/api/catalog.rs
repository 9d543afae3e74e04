//! Catalog endpoints: paginated category listing, keyword search, categories.

use std::future::Future;

use meme_shop_core::{CategoryId, ProductId};
use tracing::instrument;

use super::types::{HalCollection, PageInfo, Product, ProductCategory, ProductPage};
use super::{ApiClient, ApiError};

/// Read access to the product catalog.
pub trait CatalogGateway {
    /// One page of a category's products. `page` is 0-based.
    fn products_by_category(
        &self,
        category_id: CategoryId,
        page: u32,
        size: u32,
    ) -> impl Future<Output = Result<ProductPage, ApiError>> + Send;

    /// Products whose name contains `keyword`.
    fn search_products(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// All product categories.
    fn categories(&self) -> impl Future<Output = Result<Vec<ProductCategory>, ApiError>> + Send;

    /// A single product.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, ApiError>> + Send;
}

impl CatalogGateway for ApiClient {
    #[instrument(skip(self))]
    async fn products_by_category(
        &self,
        category_id: CategoryId,
        page: u32,
        size: u32,
    ) -> Result<ProductPage, ApiError> {
        let mut envelope: HalCollection<Product> = self
            .get_json(
                "products/search/findByCategoryId",
                &[
                    ("id", category_id.to_string()),
                    ("page", page.to_string()),
                    ("size", size.to_string()),
                ],
            )
            .await?;

        let products = envelope.take("products");
        // Some deployments omit the page block for short results
        let page = envelope.page().unwrap_or(PageInfo {
            size,
            total_elements: products.len() as u64,
            total_pages: 1,
            number: page,
        });

        Ok(ProductPage { products, page })
    }

    #[instrument(skip(self))]
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, ApiError> {
        let mut envelope: HalCollection<Product> = self
            .get_json(
                "products/search/findByNameContaining",
                &[("name", keyword.to_string())],
            )
            .await?;

        Ok(envelope.take("products"))
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<ProductCategory>, ApiError> {
        let mut envelope: HalCollection<ProductCategory> =
            self.get_json("product-category", &[]).await?;

        Ok(envelope.take("productCategory"))
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_json(&format!("products/{id}"), &[]).await
    }
}
