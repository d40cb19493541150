//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are simple functions (rather than stateful structs) that accept a `&mut SqliteConnection`
//! argument. Callers can obtain a connection from a pool, or open an atomic transaction as the need arises and call
//! through to the functions without any other changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, QueryBuilder, Sqlite, SqlitePool};

use crate::ledger_api::list_query::{escape_like, ListQuery};

pub mod analytics;
pub mod categories;
pub mod orders;
pub mod products;

const SQLITE_DB_URL: &str = "sqlite://data/shopdesk.db";

pub fn db_url() -> String {
    let result = env::var("SHOPDESK_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ SHOPDESK_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Appends the search and filter conditions of `query` as a `WHERE` clause. Field names have already been checked
/// against an allow-list by [`ListQuery`], so they are pushed verbatim; values are always bound.
pub(crate) fn push_list_conditions(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
    if !query.has_conditions() {
        return;
    }
    builder.push(" WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(search) = query.search_terms() {
        let pattern = escape_like(&search.keyword);
        where_clause.push("(");
        for (i, field) in search.fields.iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(" OR ");
            }
            where_clause.push_unseparated(format!("{field} LIKE "));
            where_clause.push_bind_unseparated(pattern.clone());
            where_clause.push_unseparated(" ESCAPE '\\'");
        }
        where_clause.push_unseparated(")");
    }
    for filter in query.filters() {
        where_clause.push(format!("{}{}", filter.field, filter.op.sql()));
        where_clause.push_bind_unseparated(filter.value.clone());
    }
}

pub(crate) fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
    if let Some(page) = query.page() {
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(page.limit));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(page.offset).unwrap_or(i64::MAX));
    }
}
