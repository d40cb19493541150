use log::debug;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Category, CategoryId},
    reconciler::ReconciliationPlan,
};

pub async fn fetch_category(id: CategoryId, conn: &mut SqliteConnection) -> Result<Option<Category>, sqlx::Error> {
    let category = sqlx::query_as("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(category)
}

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, sqlx::Error> {
    let categories = sqlx::query_as("SELECT * FROM categories ORDER BY id").fetch_all(conn).await?;
    Ok(categories)
}

pub async fn insert_category(name: &str, conn: &mut SqliteConnection) -> Result<Category, sqlx::Error> {
    let category = sqlx::query_as("INSERT INTO categories (category_name) VALUES ($1) RETURNING *")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(category)
}

pub async fn set_active(
    id: CategoryId,
    active: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Category>, sqlx::Error> {
    let category = sqlx::query_as("UPDATE categories SET is_active = $1 WHERE id = $2 RETURNING *")
        .bind(active)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(category)
}

/// Applies the category half of a reconciliation plan in one statement. `is_active` is not consulted.
pub async fn apply_category_deltas(
    plan: &ReconciliationPlan,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    if plan.categories.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::new("UPDATE categories SET sold = sold + CASE id");
    for delta in &plan.categories {
        builder.push(" WHEN ").push_bind(delta.category_id).push(" THEN ").push_bind(plan.sold_delta(delta.quantity));
    }
    builder.push(" END WHERE id IN (");
    let mut ids = builder.separated(", ");
    for delta in &plan.categories {
        ids.push_bind(delta.category_id);
    }
    ids.push_unseparated(")");
    let result = builder.build().execute(conn).await?;
    debug!(
        "🗃️ Category batch for {} updated {} of {} rows",
        plan.order_id,
        result.rows_affected(),
        plan.categories.len()
    );
    Ok(result.rows_affected())
}
