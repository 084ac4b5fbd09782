//! Product and category management ("Produtos").

use adega_core::catalog::{filter_products, in_stock};
use adega_core::{Category, CoreError, Product, ProductInput};
use adega_db::Database;

use crate::error::PosResult;

#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    /// All products by name, with their category names.
    pub async fn list_products(&self) -> PosResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    /// Products whose name contains `term` (case-insensitive), optionally
    /// restricted to one category.
    pub async fn search_products(
        &self,
        term: &str,
        category_id: Option<&str>,
    ) -> PosResult<Vec<Product>> {
        let products = self.db.products().list().await?;
        Ok(filter_products(&products, term, category_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Products with stock left, for the order-entry pickers.
    pub async fn sellable_products(&self) -> PosResult<Vec<Product>> {
        let products = self.db.products().list().await?;
        Ok(in_stock(&products).cloned().collect())
    }

    pub async fn get_product(&self, id: &str) -> PosResult<Product> {
        self.db
            .products()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    pub async fn create_product(&self, input: &ProductInput) -> PosResult<Product> {
        Ok(self.db.products().create(input).await?)
    }

    pub async fn update_product(&self, id: &str, input: &ProductInput) -> PosResult<Product> {
        Ok(self.db.products().update(id, input).await?)
    }

    /// Fails with `Conflict` while any sale line references the product.
    pub async fn delete_product(&self, id: &str) -> PosResult<()> {
        self.db.products().delete(id).await?;
        Ok(())
    }

    pub async fn list_categories(&self) -> PosResult<Vec<Category>> {
        Ok(self.db.categories().list().await?)
    }

    pub async fn create_category(&self, name: &str) -> PosResult<Category> {
        Ok(self.db.categories().create(name).await?)
    }
}
