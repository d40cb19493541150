use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use super::{push_list_conditions, push_page};
use crate::{
    db_types::{Money, NewOrder, Order, OrderId, OrderItem, OrderStatus, PaymentStatus},
    ledger_api::list_query::ListQuery,
    traits::PaymentTransition,
};

#[derive(FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    item: OrderItem,
}

/// Inserts the order header. The line items are written separately with [`insert_order_items`]. This is not atomic.
/// Embed both calls in a transaction and pass `&mut *tx` as the connection argument.
pub async fn insert_order_record(
    order: &NewOrder,
    amount_paid: Money,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                shipping_info_id,
                amount_paid,
                type_payment,
                account_name,
                account_number,
                order_status,
                payment_status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(&order.user_id)
    .bind(order.shipping_info_id)
    .bind(amount_paid)
    .bind(&order.payment_info.type_payment)
    .bind(&order.payment_info.account_name)
    .bind(&order.payment_info.account_number)
    .bind(OrderStatus::Processing)
    .bind(PaymentStatus::Unpaid)
    .bind(order.created_at)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ {} inserted for user {}", order.id, order.user_id);
    Ok(order)
}

pub async fn insert_order_items(
    order_id: OrderId,
    items: &[OrderItem],
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    if items.is_empty() {
        return Ok(());
    }
    let mut builder =
        QueryBuilder::new("INSERT INTO order_items (order_id, product_id, name, category_name, quantity, price, image) ");
    builder.push_values(items, |mut row, item| {
        row.push_bind(order_id)
            .push_bind(item.product_id)
            .push_bind(item.name.clone())
            .push_bind(item.category_name.clone())
            .push_bind(item.quantity)
            .push_bind(item.price)
            .push_bind(item.image.clone());
    });
    builder.build().execute(conn).await?;
    trace!("🗃️ {} line items stored for {order_id}", items.len());
    Ok(())
}

/// Fetches the order along with its line items.
pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    match order {
        Some(order) => {
            let mut items = fetch_items_for_orders(&[order.id], conn).await?;
            let order_items = items.remove(&order.id).unwrap_or_default();
            Ok(Some(order.with_items(order_items)))
        },
        None => Ok(None),
    }
}

/// Fetches the line items for the given orders, grouped by order, in the order they were written.
pub async fn fetch_items_for_orders(
    ids: &[OrderId],
    conn: &mut SqliteConnection,
) -> Result<HashMap<OrderId, Vec<OrderItem>>, sqlx::Error> {
    let mut result = HashMap::<OrderId, Vec<OrderItem>>::new();
    if ids.is_empty() {
        return Ok(result);
    }
    let mut builder = QueryBuilder::new("SELECT * FROM order_items WHERE order_id IN (");
    let mut id_list = builder.separated(", ");
    for id in ids {
        id_list.push_bind(*id);
    }
    id_list.push_unseparated(") ORDER BY id ASC");
    let rows = builder.build_query_as::<OrderItemRow>().fetch_all(conn).await?;
    for row in rows {
        result.entry(row.order_id).or_default().push(row.item);
    }
    Ok(result)
}

/// Fetches orders according to the criteria in `query`, newest first.
pub async fn search_orders(query: &ListQuery, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders");
    push_list_conditions(&mut builder, query);
    builder.push(" ORDER BY created_at DESC, id DESC");
    push_page(&mut builder, query);
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    let ids = orders.iter().map(|o| o.id).collect::<Vec<OrderId>>();
    let mut items = fetch_items_for_orders(&ids, conn).await?;
    let orders = orders
        .into_iter()
        .map(|o| {
            let order_items = items.remove(&o.id).unwrap_or_default();
            o.with_items(order_items)
        })
        .collect();
    Ok(orders)
}

pub async fn count_orders(query: &ListQuery, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_list_conditions(&mut builder, query);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}

/// Writes the new payment status if, and only if, the order still has the status `transition.from`.
///
/// Returns the number of rows changed, which is zero if the order is missing or its status has moved on.
pub async fn compare_and_set_payment_status(
    transition: &PaymentTransition,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders
            SET payment_status = $1, order_status = COALESCE($2, order_status), updated_at = $3
            WHERE id = $4 AND payment_status = $5
        "#,
    )
    .bind(transition.to)
    .bind(transition.order_status)
    .bind(now)
    .bind(transition.order_id)
    .bind(transition.from)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn update_order_status(
    id: OrderId,
    status: OrderStatus,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET order_status = $1, updated_at = $2 WHERE id = $3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
