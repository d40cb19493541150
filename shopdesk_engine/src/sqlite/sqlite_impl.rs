//! `SqliteDatabase` is the concrete SQLite implementation of a Shopdesk backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module.
use std::{collections::BTreeMap, fmt::Debug};

use chrono::Utc;
use log::*;
use sqlx::{migrate::MigrateError, SqliteConnection, SqlitePool};

use super::db::{analytics, categories, db_url, new_pool, orders, products};
use crate::{
    db_types::{
        Category,
        CategoryId,
        Money,
        NewOrder,
        NewProduct,
        Order,
        OrderId,
        OrderItem,
        OrderStatus,
        Product,
        ProductId,
    },
    ledger_api::{
        analytics_objects::{
            BuyerRank,
            CategorySales,
            ProductOrderRef,
            ProductSales,
            RevenuePoint,
            SalesWindow,
            StatusCounts,
        },
        list_query::ListQuery,
    },
    reconciler::ReconciliationPlan,
    traits::{
        AnalyticsError,
        CatalogManagement,
        LedgerDatabase,
        LedgerError,
        OrderManagement,
        PaymentTransition,
        SalesAnalytics,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `SHOPDESK_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date with the embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

/// Snapshots the live catalog into order lines and takes the ordered quantities out of stock.
async fn snapshot_items(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, LedgerError> {
    if order.order_items.is_empty() {
        return Err(LedgerError::ValidationError("An order must contain at least one item".to_string()));
    }
    if let Some(item) = order.order_items.iter().find(|i| i.quantity <= 0) {
        return Err(LedgerError::ValidationError(format!(
            "{} has quantity {}. Quantities must be positive",
            item.product_id, item.quantity
        )));
    }
    let mut items = Vec::with_capacity(order.order_items.len());
    let mut category_names = BTreeMap::<CategoryId, String>::new();
    for line in &order.order_items {
        let product = products::fetch_product(line.product_id, conn)
            .await?
            .ok_or(LedgerError::ProductNotFound(line.product_id))?;
        if !product.is_active {
            return Err(LedgerError::ValidationError(format!("{} is not available for sale", product.id)));
        }
        let category_name = match category_names.get(&product.category_id) {
            Some(name) => name.clone(),
            None => {
                let category = categories::fetch_category(product.category_id, conn)
                    .await?
                    .ok_or(LedgerError::CategoryNotFound(product.category_id))?;
                category_names.insert(category.id, category.category_name.clone());
                category.category_name
            },
        };
        if !products::take_stock(product.id, line.quantity, conn).await? {
            let available = products::fetch_product(product.id, conn).await?.map(|p| p.stock).unwrap_or_default();
            return Err(LedgerError::InsufficientStock {
                product_id: product.id,
                requested: line.quantity,
                available,
            });
        }
        items.push(OrderItem {
            product_id: product.id,
            name: product.name,
            category_name,
            quantity: line.quantity,
            price: product.price,
            image: product.image,
        });
    }
    Ok(items)
}

/// Applies both batches of the plan. Any error here means nothing should be committed.
async fn reconcile_inventory(plan: &ReconciliationPlan, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let product_rows = products::apply_product_deltas(plan, conn).await?;
    if product_rows < plan.products.len() as u64 {
        warn!(
            "📦️ Only {product_rows} of {} products could be updated for {}. The rest were removed from the catalog \
             after the plan was made.",
            plan.products.len(),
            plan.order_id
        );
    }
    let category_rows = categories::apply_category_deltas(plan, conn).await?;
    if category_rows < plan.categories.len() as u64 {
        warn!("📦️ Only {category_rows} of {} categories could be updated for {}", plan.categories.len(), plan.order_id);
    }
    Ok(())
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let items = snapshot_items(&order, &mut tx).await?;
        let items_total = items
            .iter()
            .map(OrderItem::line_total)
            .collect::<Option<Vec<Money>>>()
            .and_then(Money::checked_sum)
            .ok_or_else(|| LedgerError::ValidationError("The order total is too large to record".to_string()))?;
        let amount_paid =
            if order.payment_info.amount_paid == Money::default() { items_total } else { order.payment_info.amount_paid };
        let record = orders::insert_order_record(&order, amount_paid, &mut tx).await?;
        orders::insert_order_items(record.id, &items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} placed by {} with {} lines, totalling {items_total}", record.id, record.user_id, items.len());
        Ok(record.with_items(items))
    }

    async fn apply_payment_transition(&self, transition: PaymentTransition) -> Result<Order, LedgerError> {
        let order_id = transition.order_id;
        let mut tx = self.pool.begin().await?;
        if let Some(plan) = &transition.plan {
            if let Err(e) = reconcile_inventory(plan, &mut tx).await {
                error!(
                    "📦️ Inventory reconciliation failed. The transaction has been rolled back and {order_id} is still \
                     '{}'. Planned changes: {plan}. Error: {e}",
                    transition.from
                );
                tx.rollback().await?;
                return Err(LedgerError::ReconciliationFailure { order_id, details: e.to_string() });
            }
        }
        let changed = orders::compare_and_set_payment_status(&transition, Utc::now(), &mut tx).await?;
        if changed == 0 {
            let exists = orders::fetch_order(order_id, &mut tx).await?.is_some();
            tx.rollback().await?;
            if !exists {
                return Err(LedgerError::OrderNotFound(order_id));
            }
            warn!(
                "🗃️ {order_id} was modified by another request before its status could move from '{}' to '{}'. All \
                 changes have been rolled back.",
                transition.from, transition.to
            );
            return Err(LedgerError::StaleOrderStatus { order_id, expected: transition.from });
        }
        let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(LedgerError::OrderNotFound(order_id))?;
        tx.commit().await?;
        debug!("🗃️ {order_id} payment status changed from '{}' to '{}'", transition.from, transition.to);
        Ok(order)
    }

    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if orders::update_order_status(order_id, status, Utc::now(), &mut tx).await? == 0 {
            return Err(LedgerError::OrderNotFound(order_id));
        }
        let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(LedgerError::OrderNotFound(order_id))?;
        tx.commit().await?;
        debug!("🗃️ {order_id} order status changed to '{status}'");
        Ok(order)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: ListQuery) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(&query, &mut conn).await?;
        Ok(orders)
    }

    async fn count_orders(&self, query: ListQuery) -> Result<i64, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let count = orders::count_orders(&query, &mut conn).await?;
        Ok(count)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(ids, &mut conn).await?;
        Ok(products)
    }

    async fn fetch_category(&self, id: CategoryId) -> Result<Option<Category>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let category = categories::fetch_category(id, &mut conn).await?;
        Ok(category)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let categories = categories::fetch_categories(&mut conn).await?;
        Ok(categories)
    }

    async fn insert_category(&self, name: &str) -> Result<Category, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let category = categories::insert_category(name, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} created with name '{}'", category.id, category.category_name);
        Ok(category)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let category_id = product.category_id;
        if categories::fetch_category(category_id, &mut tx).await?.is_none() {
            return Err(LedgerError::CategoryNotFound(category_id));
        }
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} created in {category_id}", product.id);
        Ok(product)
    }

    async fn set_product_category(&self, id: ProductId, category: CategoryId) -> Result<Product, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if categories::fetch_category(category, &mut tx).await?.is_none() {
            return Err(LedgerError::CategoryNotFound(category));
        }
        let product = products::set_category(id, category, &mut tx).await?.ok_or(LedgerError::ProductNotFound(id))?;
        tx.commit().await?;
        debug!("🗃️ {id} moved to {category}");
        Ok(product)
    }

    async fn set_category_active(&self, id: CategoryId, active: bool) -> Result<Category, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let category = categories::set_active(id, active, &mut tx).await?.ok_or(LedgerError::CategoryNotFound(id))?;
        tx.commit().await?;
        Ok(category)
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        if !products::delete_product(id, &mut conn).await? {
            return Err(LedgerError::ProductNotFound(id));
        }
        info!("🗃️ {id} deleted from the catalog");
        Ok(())
    }

    async fn search_products(&self, query: ListQuery) -> Result<Vec<Product>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::search_products(&query, &mut conn).await?;
        Ok(products)
    }
}

impl SalesAnalytics for SqliteDatabase {
    async fn product_sales_ranking(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<ProductSales>, AnalyticsError> {
        let mut conn = self.pool.acquire().await?;
        let result = analytics::product_sales_ranking(window, limit, &mut conn).await?;
        Ok(result)
    }

    async fn category_sales_ranking(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<CategorySales>, AnalyticsError> {
        let mut conn = self.pool.acquire().await?;
        let result = analytics::category_sales_ranking(window, limit, &mut conn).await?;
        Ok(result)
    }

    async fn buyers_by_order_count(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<BuyerRank>, AnalyticsError> {
        let mut conn = self.pool.acquire().await?;
        let result = analytics::buyers_by_order_count(window, limit, &mut conn).await?;
        Ok(result)
    }

    async fn buyers_by_amount_paid(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<BuyerRank>, AnalyticsError> {
        let mut conn = self.pool.acquire().await?;
        let result = analytics::buyers_by_amount_paid(window, limit, &mut conn).await?;
        Ok(result)
    }

    async fn order_counts_by_status(&self, window: Option<SalesWindow>) -> Result<StatusCounts, AnalyticsError> {
        let mut conn = self.pool.acquire().await?;
        let counts = analytics::order_counts_by_status(window, &mut conn).await?;
        Ok(counts)
    }

    async fn revenue_for_product(&self, product_id: ProductId) -> Result<Vec<RevenuePoint>, AnalyticsError> {
        let mut conn = self.pool.acquire().await?;
        let points = analytics::revenue_for_product(product_id, &mut conn).await?;
        Ok(points)
    }

    async fn orders_containing_product(&self, product_id: ProductId) -> Result<Vec<ProductOrderRef>, AnalyticsError> {
        let mut conn = self.pool.acquire().await?;
        let refs = analytics::orders_containing_product(product_id, &mut conn).await?;
        Ok(refs)
    }
}
