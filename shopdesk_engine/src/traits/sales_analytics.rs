use thiserror::Error;

use crate::{
    db_types::ProductId,
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

#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid sales window. {0}")]
    InvalidWindow(String),
}

impl From<sqlx::Error> for AnalyticsError {
    fn from(e: sqlx::Error) -> Self {
        AnalyticsError::DatabaseError(e.to_string())
    }
}

/// Read-only aggregations over the order ledger.
///
/// Every sales figure is computed from the line-item snapshots stored with the orders, never from the live catalog.
/// A `window` of `None` means "since the beginning". Rankings return at most `limit` rows.
#[allow(async_fn_in_trait)]
pub trait SalesAnalytics {
    /// Paid sales grouped by product, sorted by total amount (descending), then total quantity (ascending).
    async fn product_sales_ranking(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<ProductSales>, AnalyticsError>;

    /// Paid sales grouped by the category name recorded on the order lines. Same ordering as
    /// [`Self::product_sales_ranking`].
    async fn category_sales_ranking(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<CategorySales>, AnalyticsError>;

    /// Buyers ranked by the number of paid orders they placed.
    async fn buyers_by_order_count(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<BuyerRank>, AnalyticsError>;

    /// Buyers ranked by the total amount paid over their paid orders.
    async fn buyers_by_amount_paid(
        &self,
        window: Option<SalesWindow>,
        limit: u32,
    ) -> Result<Vec<BuyerRank>, AnalyticsError>;

    /// Order counts by status. `paid` and `unpaid` count payment statuses; the remaining fields count fulfilment
    /// statuses. All orders are considered, whatever their payment status.
    async fn order_counts_by_status(&self, window: Option<SalesWindow>) -> Result<StatusCounts, AnalyticsError>;

    /// One point per paid order line for the product, oldest first.
    async fn revenue_for_product(&self, product_id: ProductId) -> Result<Vec<RevenuePoint>, AnalyticsError>;

    /// Every order (in any status) that contains the product, oldest first.
    async fn orders_containing_product(&self, product_id: ProductId) -> Result<Vec<ProductOrderRef>, AnalyticsError>;
}
