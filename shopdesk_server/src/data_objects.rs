use serde::{Deserialize, Serialize};
use shopdesk_engine::{
    analytics_objects::SalesWindow,
    db_types::{Order, OrderId, OrderStatus, OrderUpdate, PaymentStatus, Product},
};

use crate::errors::ServerError;

/// The body of `PUT /orders/{id}`. Either field may be omitted, but not both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderParams {
    #[serde(default)]
    pub order_status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateOrderParams {
    pub fn into_update(self, order_id: OrderId) -> Result<OrderUpdate, ServerError> {
        let update = OrderUpdate { order_id, payment_status: self.payment_status, order_status: self.order_status };
        if update.is_empty() {
            return Err(ServerError::ValidationError(
                "Supply at least one of orderStatus and paymentStatus".to_string(),
            ));
        }
        Ok(update)
    }
}

/// Optional `?month=&year=` parameters for the dashboards.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WindowParams {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl WindowParams {
    pub fn window(&self) -> Result<Option<SalesWindow>, ServerError> {
        let window = SalesWindow::from_parts(self.month, self.year)?;
        Ok(window)
    }
}

/// Settings shared by the list endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ListSettings {
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderList {
    pub orders: Vec<Order>,
    /// The number of orders matching the query, ignoring pagination.
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub products: Vec<Product>,
}
