use crate::{
    db_types::{Order, OrderId},
    ledger_api::list_query::ListQuery,
    traits::LedgerError,
};

/// The `OrderManagement` trait defines the behaviour for querying orders in the database backend.
///
/// Orders are always returned with their line items.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, LedgerError>;

    /// Fetches the orders matching the search, filter and page settings in `query`, newest first.
    async fn search_orders(&self, query: ListQuery) -> Result<Vec<Order>, LedgerError>;

    /// Counts the orders matching the search and filter settings in `query`. Paging is ignored.
    async fn count_orders(&self, query: ListQuery) -> Result<i64, LedgerError>;
}
