use thiserror::Error;

use crate::{
    db_types::{OrderId, PaymentStatus},
    traits::LedgerError,
    transitions::InvalidTransition,
};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    /// The requested status is not reachable from the current one. Nothing was changed.
    #[error("{0}")]
    InvalidTransition(#[from] InvalidTransition),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid request. {0}")]
    Validation(String),
    /// The inventory batches could not be applied. The order's status was left as it was.
    #[error("Inventory reconciliation failed for {order_id}. {details}")]
    ReconciliationFailure { order_id: OrderId, details: String },
    /// Another request changed the order's payment status between our read and our write.
    #[error("{order_id} no longer has payment status '{expected}'. It was modified by another request.")]
    StaleOrderStatus { order_id: OrderId, expected: PaymentStatus },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<LedgerError> for OrderFlowError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::OrderNotFound(_) | LedgerError::ProductNotFound(_) | LedgerError::CategoryNotFound(_) => {
                Self::NotFound(e.to_string())
            },
            LedgerError::InsufficientStock { .. } | LedgerError::ValidationError(_) => Self::Validation(e.to_string()),
            LedgerError::StaleOrderStatus { order_id, expected } => Self::StaleOrderStatus { order_id, expected },
            LedgerError::ReconciliationFailure { order_id, details } => {
                Self::ReconciliationFailure { order_id, details }
            },
            LedgerError::DatabaseError(s) => Self::DatabaseError(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ListQueryError {
    #[error("Cannot filter or search on field '{0}'")]
    UnknownField(String),
    #[error("Unknown filter operator '{0}'. Use one of eq, gt, gte, lt, lte")]
    UnknownOperator(String),
    #[error("Malformed filter key '{0}'. Expected field[op]")]
    MalformedKey(String),
}
