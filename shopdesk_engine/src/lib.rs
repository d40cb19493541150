//! Shopdesk Engine
//!
//! The Shopdesk engine is the backend logic behind an e-commerce admin dashboard. It drives orders through their
//! payment lifecycle, keeps product and category sales counters in step with the ledger, and derives sales analytics
//! from the order history.
//!
//! The library is divided into these sections:
//! 1. The data types ([`mod@db_types`]) shared by every layer.
//! 2. The payment status rules ([`mod@transitions`]) and the inventory reconciliation planner
//!    ([`mod@reconciler`]). Both are pure, and hold the business rules.
//! 3. Database backend traits ([`mod@traits`]) and the SQLite backend. You should not need to access the database
//!    directly; use the public API instead.
//! 4. The public API ([`mod@ledger_api`]): [`OrderFlowApi`], [`SalesAnalyticsApi`] and [`CatalogApi`].
pub mod db_types;
pub mod ledger_api;
pub mod reconciler;
pub mod traits;
pub mod transitions;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use ledger_api::{
    analytics_api::SalesAnalyticsApi,
    analytics_objects,
    catalog_api::CatalogApi,
    errors::{ListQueryError, OrderFlowError},
    list_query,
    order_flow_api::OrderFlowApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AnalyticsError,
    CatalogManagement,
    LedgerDatabase,
    LedgerError,
    OrderManagement,
    PaymentTransition,
    SalesAnalytics,
};
pub use transitions::{InvalidTransition, InventoryEffect, TransitionPolicy};
