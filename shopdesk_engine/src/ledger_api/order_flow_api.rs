use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderUpdate, ProductId},
    ledger_api::{errors::OrderFlowError, list_query::ListQuery},
    reconciler::{quantities_by_product, ReconciliationPlan},
    traits::{CatalogManagement, LedgerDatabase, OrderManagement, PaymentTransition},
    transitions::{InventoryEffect, TransitionPolicy},
};

/// `OrderFlowApi` is the primary API for placing orders and moving them through the payment lifecycle.
///
/// Every change of payment status goes through [`Self::update_order`], which is the only place inventory is
/// reconciled.
pub struct OrderFlowApi<B> {
    db: B,
    policy: TransitionPolicy,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.policy)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, policy: TransitionPolicy) -> Self {
        Self { db, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }
}

impl<B> OrderFlowApi<B>
where B: LedgerDatabase + OrderManagement + CatalogManagement
{
    /// Appends a new order to the ledger. The order starts out `unpaid`; its line items are snapshots of the
    /// catalog at this moment.
    pub async fn place_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let user = order.user_id.clone();
        let order = self.db.insert_order(order).await?;
        info!("🔄️ New order {} placed by {user} for {}", order.id, order.payment_info.amount_paid);
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: OrderId) -> Result<Order, OrderFlowError> {
        self.db.fetch_order(order_id).await?.ok_or_else(|| OrderFlowError::NotFound(format!("{order_id} does not exist")))
    }

    pub async fn search_orders(&self, query: ListQuery) -> Result<Vec<Order>, OrderFlowError> {
        trace!("🔄️ Searching orders. {query}");
        let orders = self.db.search_orders(query).await?;
        Ok(orders)
    }

    pub async fn count_orders(&self, query: ListQuery) -> Result<i64, OrderFlowError> {
        let count = self.db.count_orders(query).await?;
        Ok(count)
    }

    /// Applies an admin's update to an order.
    ///
    /// * The requested payment status is checked against the [`TransitionPolicy`] before anything is written. An
    ///   illegal request leaves the order untouched and returns [`OrderFlowError::InvalidTransition`].
    /// * For a sale or a reversal, a [`ReconciliationPlan`] is built against the live catalog and handed to the
    ///   backend, which applies it together with the status change.
    /// * A fulfilment status on its own is written as is.
    pub async fn update_order(&self, update: OrderUpdate) -> Result<Order, OrderFlowError> {
        if update.is_empty() {
            return Err(OrderFlowError::Validation(
                "Nothing to update. Supply a payment status, an order status, or both".to_string(),
            ));
        }
        let order = self.fetch_order(update.order_id).await?;
        let Some(requested) = update.payment_status else {
            return self.update_fulfilment_status(update).await;
        };
        let current = order.payment_status;
        let effect = self.policy.check(current, requested).map_err(|e| {
            warn!("🔄️ Rejected update for {}. {e}", order.id);
            e
        })?;
        let plan = match effect {
            Some(effect) => Some(self.plan_reconciliation(&order, effect).await?),
            None => None,
        };
        let transition =
            PaymentTransition::new(order.id, current, requested).with_order_status(update.order_status).with_plan(plan);
        let updated = self.db.apply_payment_transition(transition).await?;
        info!("🔄️ {} moved from '{current}' to '{requested}'", updated.id);
        Ok(updated)
    }

    async fn update_fulfilment_status(&self, update: OrderUpdate) -> Result<Order, OrderFlowError> {
        let Some(status) = update.order_status else {
            return Err(OrderFlowError::Validation("No order status was supplied".to_string()));
        };
        let order = self.db.update_order_status(update.order_id, status).await?;
        info!("🔄️ {} is now '{status}'", order.id);
        Ok(order)
    }

    async fn plan_reconciliation(
        &self,
        order: &Order,
        effect: InventoryEffect,
    ) -> Result<ReconciliationPlan, OrderFlowError> {
        let ids = quantities_by_product(&order.order_items).into_keys().collect::<Vec<ProductId>>();
        let live = self.db.fetch_products(&ids).await?;
        let plan = ReconciliationPlan::build(order, effect, &live);
        if !plan.skipped.is_empty() {
            warn!(
                "📦️ {} product(s) on {} no longer exist and will not be reconciled: {:?}",
                plan.skipped.len(),
                order.id,
                plan.skipped
            );
        }
        debug!("📦️ Reconciliation plan: {plan}");
        Ok(plan)
    }
}
