use crate::{
    db_types::{Category, CategoryId, NewProduct, Product, ProductId},
    ledger_api::list_query::ListQuery,
    traits::LedgerError,
};

/// Products and categories.
///
/// Only the operations that the order flow and the dashboards rely on are provided here. The `sold` counters are
/// never written through this trait; they belong to [`crate::traits::LedgerDatabase`].
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, LedgerError>;

    /// Fetches the products with the given ids. Ids that do not exist are silently left out of the result.
    async fn fetch_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, LedgerError>;

    async fn fetch_category(&self, id: CategoryId) -> Result<Option<Category>, LedgerError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, LedgerError>;

    async fn insert_category(&self, name: &str) -> Result<Category, LedgerError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, LedgerError>;

    /// Moves a product into another category. Existing order lines keep the category name they were sold under.
    async fn set_product_category(&self, id: ProductId, category: CategoryId) -> Result<Product, LedgerError>;

    async fn set_category_active(&self, id: CategoryId, active: bool) -> Result<Category, LedgerError>;

    /// Removes a product from the catalog. Order lines that reference it are left untouched.
    async fn delete_product(&self, id: ProductId) -> Result<(), LedgerError>;

    async fn search_products(&self, query: ListQuery) -> Result<Vec<Product>, LedgerError>;
}
