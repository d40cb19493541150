use serde::{Deserialize, Serialize};

use crate::{
    db_types::{OrderId, OrderStatus, PaymentStatus},
    reconciler::ReconciliationPlan,
};

/// A validated payment status change, ready to be written to the ledger.
///
/// `from` is the status the caller observed. The backend only applies the change if the order still has that
/// status when the write happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransition {
    pub order_id: OrderId,
    pub from: PaymentStatus,
    pub to: PaymentStatus,
    /// A fulfilment status to write in the same transaction, if any.
    pub order_status: Option<OrderStatus>,
    /// The inventory adjustments. `None` for transitions without side effects.
    pub plan: Option<ReconciliationPlan>,
}

impl PaymentTransition {
    pub fn new(order_id: OrderId, from: PaymentStatus, to: PaymentStatus) -> Self {
        Self { order_id, from, to, order_status: None, plan: None }
    }

    pub fn with_order_status(mut self, status: Option<OrderStatus>) -> Self {
        self.order_status = status;
        self
    }

    pub fn with_plan(mut self, plan: Option<ReconciliationPlan>) -> Self {
        self.plan = plan;
        self
    }
}
