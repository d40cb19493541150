use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use super::{push_list_conditions, push_page};
use crate::{
    db_types::{CategoryId, NewProduct, Product, ProductId},
    ledger_api::list_query::ListQuery,
    reconciler::ReconciliationPlan,
};

pub async fn fetch_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

/// Fetches the products with the given ids, ordered by id. Missing ids are ignored.
pub async fn fetch_products(ids: &[ProductId], conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE id IN (");
    let mut id_list = builder.separated(", ");
    for id in ids {
        id_list.push_bind(*id);
    }
    id_list.push_unseparated(") ORDER BY id");
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    trace!("🗃️ Fetched {} of {} requested products", products.len(), ids.len());
    Ok(products)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (name, price, stock, category_id, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.category_id)
    .bind(product.image)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn set_category(
    id: ProductId,
    category_id: CategoryId,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("UPDATE products SET category_id = $1 WHERE id = $2 RETURNING *")
        .bind(category_id)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Returns `true` if the product existed.
pub async fn delete_product(id: ProductId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn search_products(query: &ListQuery, conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM products");
    push_list_conditions(&mut builder, query);
    builder.push(" ORDER BY id ASC");
    push_page(&mut builder, query);
    trace!("🗃️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

/// Takes `quantity` units out of stock, provided there are enough. Returns `false` (and changes nothing) otherwise.
pub async fn take_stock(id: ProductId, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $3")
        .bind(quantity)
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Applies the product half of a reconciliation plan as a single statement:
///
/// ```sql
/// UPDATE products
/// SET sold = sold + CASE id WHEN ? THEN ? ... END,
///     stock = stock + CASE id WHEN ? THEN ? ... END   -- reversals only
/// WHERE id IN (?, ...)
/// ```
///
/// Returns the number of rows updated. Products that have disappeared since the plan was made are not an error.
pub async fn apply_product_deltas(plan: &ReconciliationPlan, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    if plan.products.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::new("UPDATE products SET sold = sold + CASE id");
    for delta in &plan.products {
        builder.push(" WHEN ").push_bind(delta.product_id).push(" THEN ").push_bind(plan.sold_delta(delta.quantity));
    }
    builder.push(" END");
    if plan.effect.restores_stock() {
        builder.push(", stock = stock + CASE id");
        for delta in &plan.products {
            builder
                .push(" WHEN ")
                .push_bind(delta.product_id)
                .push(" THEN ")
                .push_bind(plan.stock_delta(delta.quantity));
        }
        builder.push(" END");
    }
    builder.push(" WHERE id IN (");
    let mut ids = builder.separated(", ");
    for delta in &plan.products {
        ids.push_bind(delta.product_id);
    }
    ids.push_unseparated(")");
    let result = builder.build().execute(conn).await?;
    debug!("🗃️ Product batch for {} updated {} of {} rows", plan.order_id, result.rows_affected(), plan.products.len());
    Ok(result.rows_affected())
}
