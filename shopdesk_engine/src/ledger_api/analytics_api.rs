use std::fmt::Debug;

use log::*;

use crate::{
    db_types::ProductId,
    ledger_api::analytics_objects::{
        BuyerStats,
        CategorySales,
        ProductOrderRef,
        ProductSales,
        ProductUsage,
        PurchasingStats,
        RevenuePoint,
        SalesWindow,
        DEFAULT_RANKING_LIMIT,
    },
    traits::{AnalyticsError, SalesAnalytics},
};

/// Read-only dashboards over the order ledger. Every ranking is capped at the configured ranking limit.
pub struct SalesAnalyticsApi<B> {
    db: B,
    ranking_limit: u32,
}

impl<B> Debug for SalesAnalyticsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SalesAnalyticsApi (limit {})", self.ranking_limit)
    }
}

impl<B> SalesAnalyticsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, ranking_limit: DEFAULT_RANKING_LIMIT }
    }

    pub fn with_ranking_limit(mut self, limit: u32) -> Self {
        self.ranking_limit = limit.max(1);
        self
    }

    pub fn ranking_limit(&self) -> u32 {
        self.ranking_limit
    }
}

impl<B> SalesAnalyticsApi<B>
where B: SalesAnalytics
{
    /// Status counts plus the category ranking for the window.
    pub async fn purchasing_stats(&self, window: Option<SalesWindow>) -> Result<PurchasingStats, AnalyticsError> {
        let counts = self.db.order_counts_by_status(window).await?;
        let categories = self.db.category_sales_ranking(window, self.ranking_limit).await?;
        trace!("📊️ Purchasing stats for {}: {counts:?}, {} categories", describe(window), categories.len());
        Ok(PurchasingStats { window, counts, categories })
    }

    pub async fn product_sales(&self, window: Option<SalesWindow>) -> Result<Vec<ProductSales>, AnalyticsError> {
        let ranking = self.db.product_sales_ranking(window, self.ranking_limit).await?;
        trace!("📊️ {} products ranked for {}", ranking.len(), describe(window));
        Ok(ranking)
    }

    pub async fn category_sales(&self, window: Option<SalesWindow>) -> Result<Vec<CategorySales>, AnalyticsError> {
        self.db.category_sales_ranking(window, self.ranking_limit).await
    }

    /// The two buyer rankings.
    ///
    /// With a window, both rankings cover that month. Without one, the order-count ranking covers the whole ledger
    /// while the amount-paid ranking covers the current month.
    pub async fn buyer_stats(&self, window: Option<SalesWindow>) -> Result<BuyerStats, AnalyticsError> {
        let by_order_count = self.db.buyers_by_order_count(window, self.ranking_limit).await?;
        let month = window.unwrap_or_else(SalesWindow::current);
        let by_amount_paid = self.db.buyers_by_amount_paid(Some(month), self.ranking_limit).await?;
        trace!(
            "📊️ Buyer stats: {} by order count ({}), {} by amount paid ({month})",
            by_order_count.len(),
            describe(window),
            by_amount_paid.len()
        );
        Ok(BuyerStats { window, by_order_count, by_amount_paid })
    }

    pub async fn revenue_for_product(&self, product_id: ProductId) -> Result<Vec<RevenuePoint>, AnalyticsError> {
        self.db.revenue_for_product(product_id).await
    }

    pub async fn orders_containing_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductOrderRef>, AnalyticsError> {
        self.db.orders_containing_product(product_id).await
    }

    /// Whether the product can still be edited or removed. Products that appear on a paid order cannot.
    pub async fn product_usage(&self, product_id: ProductId) -> Result<ProductUsage, AnalyticsError> {
        let orders = self.db.orders_containing_product(product_id).await?;
        let usage = ProductUsage::from_orders(product_id, &orders);
        debug!("📊️ {product_id} appears on {} orders ({} paid)", usage.order_count, usage.paid_order_count);
        Ok(usage)
    }
}

fn describe(window: Option<SalesWindow>) -> String {
    window.map(|w| w.to_string()).unwrap_or_else(|| "all time".to_string())
}
