use thiserror::Error;

use crate::{
    db_types::{CategoryId, NewOrder, Order, OrderId, OrderStatus, PaymentStatus, ProductId},
    traits::PaymentTransition,
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("The requested category {0} does not exist")]
    CategoryNotFound(CategoryId),
    #[error("Not enough stock for {product_id}. {requested} requested, but only {available} available")]
    InsufficientStock { product_id: ProductId, requested: i64, available: i64 },
    #[error("{order_id} no longer has payment status '{expected}'")]
    StaleOrderStatus { order_id: OrderId, expected: PaymentStatus },
    #[error("Could not apply inventory changes for {order_id}. {details}")]
    ReconciliationFailure { order_id: OrderId, details: String },
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// `LedgerDatabase` owns every write to the order ledger.
///
/// Implementations must guarantee that a payment transition and its inventory side effects land together or not
/// at all.
#[allow(async_fn_in_trait)]
pub trait LedgerDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Appends a new order to the ledger. In a single atomic transaction:
    /// * the line items are snapshotted from the live product and category records,
    /// * each product's stock is reduced by the ordered quantity,
    /// * the order is stored as `unpaid` and `Processing`.
    ///
    /// `amount_paid` is set to the items total if the request leaves it at zero.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, LedgerError>;

    /// Applies a payment status change and its reconciliation plan atomically.
    ///
    /// The product batch is applied first, then the category batch, then the status is written with a
    /// compare-and-set against `transition.from`. If the order's status has moved on in the meantime, everything
    /// is rolled back and [`LedgerError::StaleOrderStatus`] is returned. If either batch fails, everything is rolled
    /// back and [`LedgerError::ReconciliationFailure`] is returned.
    async fn apply_payment_transition(&self, transition: PaymentTransition) -> Result<Order, LedgerError>;

    /// Changes the fulfilment status of an order. This carries no inventory side effects.
    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, LedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}
