//! Sales aggregations over the order ledger.
//!
//! All sales figures are read from the `order_items` snapshots joined to `orders`. The live `products` and
//! `categories` tables are never consulted, so deleting or reclassifying a product does not rewrite history.
//!
//! Windows are applied as `created_at >= start AND created_at < end`. Both bounds are bound as `DateTime<Utc>`,
//! which sqlx encodes in the same RFC 3339 form that order timestamps are stored in.
use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{PaymentStatus, ProductId},
    ledger_api::analytics_objects::{
        BuyerRank,
        CategorySales,
        ProductOrderRef,
        ProductSales,
        RevenuePoint,
        SalesWindow,
        StatusCounts,
    },
};

fn push_window(builder: &mut QueryBuilder<'_, Sqlite>, window: Option<SalesWindow>, keyword: &str) {
    if let Some(window) = window {
        builder
            .push(keyword)
            .push(" o.created_at >= ")
            .push_bind(window.start())
            .push(" AND o.created_at < ")
            .push_bind(window.end());
    }
}

fn paid_lines(select: &str, window: Option<SalesWindow>) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(select);
    builder.push(" FROM order_items oi JOIN orders o ON o.id = oi.order_id WHERE o.payment_status = ");
    builder.push_bind(PaymentStatus::Paid);
    push_window(&mut builder, window, " AND");
    builder
}

/// Ranks products by paid revenue. The name, category and image come from the product's most recent line in the
/// window, so a renamed or reclassified product is reported as it was last sold.
pub async fn product_sales_ranking(
    window: Option<SalesWindow>,
    limit: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductSales>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
        WITH lines AS (
            SELECT oi.id AS line_id, oi.product_id, oi.name, oi.category_name, oi.image, oi.price, oi.quantity,
                o.created_at
            FROM order_items oi JOIN orders o ON o.id = oi.order_id
            WHERE o.payment_status = "#,
    );
    builder.push_bind(PaymentStatus::Paid);
    push_window(&mut builder, window, " AND");
    builder.push(
        r#"
        ),
        totals AS (
            SELECT product_id, SUM(price * quantity) AS total_amount, SUM(quantity) AS total_quantity
            FROM lines
            GROUP BY product_id
        )
        SELECT
            t.product_id AS product_id,
            t.total_amount AS total_amount,
            t.total_quantity AS total_quantity,
            l.name AS name,
            l.category_name AS category,
            l.image AS image
        FROM totals t
        JOIN lines l ON l.line_id = (
            SELECT x.line_id FROM lines x
            WHERE x.product_id = t.product_id
            ORDER BY x.created_at DESC, x.line_id DESC
            LIMIT 1
        )
        ORDER BY t.total_amount DESC, t.total_quantity ASC, t.product_id ASC
        LIMIT "#,
    );
    builder.push_bind(i64::from(limit));
    trace!("📊️ Executing query: {}", builder.sql());
    let result = builder.build_query_as::<ProductSales>().fetch_all(conn).await?;
    Ok(result)
}

pub async fn category_sales_ranking(
    window: Option<SalesWindow>,
    limit: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<CategorySales>, sqlx::Error> {
    let mut builder = paid_lines(
        r#"
        SELECT
            oi.category_name AS category,
            SUM(oi.price * oi.quantity) AS total_amount,
            SUM(oi.quantity) AS total_quantity"#,
        window,
    );
    builder.push(" GROUP BY oi.category_name ORDER BY total_amount DESC, total_quantity ASC, category ASC LIMIT ");
    builder.push_bind(i64::from(limit));
    trace!("📊️ Executing query: {}", builder.sql());
    let result = builder.build_query_as::<CategorySales>().fetch_all(conn).await?;
    Ok(result)
}

/// Groups paid orders by user. `order_by` is a fixed ranking key, never user input.
async fn rank_buyers(
    window: Option<SalesWindow>,
    limit: u32,
    order_by: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<BuyerRank>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT
            o.user_id AS user_id,
            COUNT(*) AS order_count,
            SUM(o.amount_paid) AS total_amount
        FROM orders o
        WHERE o.payment_status = "#,
    );
    builder.push_bind(PaymentStatus::Paid);
    push_window(&mut builder, window, " AND");
    builder.push(" GROUP BY o.user_id ORDER BY ").push(order_by).push(" LIMIT ");
    builder.push_bind(i64::from(limit));
    trace!("📊️ Executing query: {}", builder.sql());
    let result = builder.build_query_as::<BuyerRank>().fetch_all(conn).await?;
    Ok(result)
}

pub async fn buyers_by_order_count(
    window: Option<SalesWindow>,
    limit: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<BuyerRank>, sqlx::Error> {
    rank_buyers(window, limit, "order_count DESC, total_amount DESC, user_id ASC", conn).await
}

pub async fn buyers_by_amount_paid(
    window: Option<SalesWindow>,
    limit: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<BuyerRank>, sqlx::Error> {
    rank_buyers(window, limit, "total_amount DESC, order_count DESC, user_id ASC", conn).await
}

pub async fn order_counts_by_status(
    window: Option<SalesWindow>,
    conn: &mut SqliteConnection,
) -> Result<StatusCounts, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN o.payment_status = 'paid' THEN 1 ELSE 0 END), 0) AS paid,
            COALESCE(SUM(CASE WHEN o.payment_status = 'unpaid' THEN 1 ELSE 0 END), 0) AS unpaid,
            COALESCE(SUM(CASE WHEN o.order_status = 'Processing' THEN 1 ELSE 0 END), 0) AS processing,
            COALESCE(SUM(CASE WHEN o.order_status = 'Shipped' THEN 1 ELSE 0 END), 0) AS shipped,
            COALESCE(SUM(CASE WHEN o.order_status = 'Delivered' THEN 1 ELSE 0 END), 0) AS delivered
        FROM orders o"#,
    );
    push_window(&mut builder, window, " WHERE");
    let counts = builder.build_query_as::<StatusCounts>().fetch_one(conn).await?;
    Ok(counts)
}

pub async fn revenue_for_product(
    product_id: ProductId,
    conn: &mut SqliteConnection,
) -> Result<Vec<RevenuePoint>, sqlx::Error> {
    let points = sqlx::query_as(
        r#"
        SELECT o.created_at AS date, oi.quantity AS quantity, oi.price AS price
        FROM order_items oi JOIN orders o ON o.id = oi.order_id
        WHERE oi.product_id = $1 AND o.payment_status = $2
        ORDER BY o.created_at ASC, o.id ASC, oi.id ASC
        "#,
    )
    .bind(product_id)
    .bind(PaymentStatus::Paid)
    .fetch_all(conn)
    .await?;
    Ok(points)
}

pub async fn orders_containing_product(
    product_id: ProductId,
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductOrderRef>, sqlx::Error> {
    let refs = sqlx::query_as(
        r#"
        SELECT DISTINCT o.id AS order_id, o.created_at AS date, o.payment_status AS payment_status
        FROM orders o JOIN order_items oi ON oi.order_id = o.id
        WHERE oi.product_id = $1
        ORDER BY date ASC, order_id ASC
        "#,
    )
    .bind(product_id)
    .fetch_all(conn)
    .await?;
    Ok(refs)
}
