use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Category, CategoryId, NewProduct, Product, ProductId},
    ledger_api::list_query::ListQuery,
    traits::{CatalogManagement, LedgerError},
};

/// Basic product and category management.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn create_category(&self, name: &str) -> Result<Category, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::ValidationError("Category name cannot be empty".to_string()));
        }
        self.db.insert_category(name).await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, LedgerError> {
        if product.name.trim().is_empty() {
            return Err(LedgerError::ValidationError("Product name cannot be empty".to_string()));
        }
        if product.price.is_negative() {
            return Err(LedgerError::ValidationError(format!("Price cannot be negative ({})", product.price)));
        }
        if product.stock < 0 {
            return Err(LedgerError::ValidationError(format!("Stock cannot be negative ({})", product.stock)));
        }
        let product = self.db.insert_product(product).await?;
        info!("🗃️ New product {} '{}' added", product.id, product.name);
        Ok(product)
    }

    pub async fn fetch_product(&self, id: ProductId) -> Result<Product, LedgerError> {
        self.db.fetch_product(id).await?.ok_or(LedgerError::ProductNotFound(id))
    }

    pub async fn fetch_category(&self, id: CategoryId) -> Result<Category, LedgerError> {
        self.db.fetch_category(id).await?.ok_or(LedgerError::CategoryNotFound(id))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, LedgerError> {
        self.db.fetch_categories().await
    }

    /// Moves a product into another category. Sales already recorded keep their original category name.
    pub async fn reclassify_product(&self, id: ProductId, category: CategoryId) -> Result<Product, LedgerError> {
        self.db.set_product_category(id, category).await
    }

    pub async fn set_category_active(&self, id: CategoryId, active: bool) -> Result<Category, LedgerError> {
        self.db.set_category_active(id, active).await
    }

    /// Removes the product from the catalog. Orders that contain it are not affected, and it is skipped when those
    /// orders are reconciled.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), LedgerError> {
        self.db.delete_product(id).await
    }

    pub async fn search_products(&self, query: ListQuery) -> Result<Vec<Product>, LedgerError> {
        trace!("🗃️ Searching products. {query}");
        self.db.search_products(query).await
    }
}
