//! # Database backend traits
//!
//! This module defines the interface contracts that a Shopdesk database *backend* needs to satisfy. The public APIs
//! in [`crate::ledger_api`] are generic over these traits, so that the server can be tested against mocks and the
//! storage engine can be swapped out.
//!
//! * [`LedgerDatabase`] owns every write to the order ledger: appending orders, and the atomic payment transitions
//!   that carry inventory side effects.
//! * [`OrderManagement`] provides read access to orders.
//! * [`CatalogManagement`] handles products and categories.
//! * [`SalesAnalytics`] is the read-only family of aggregations that power the dashboards.
mod catalog_management;
mod data_objects;
mod ledger_database;
mod order_management;
mod sales_analytics;

pub use catalog_management::CatalogManagement;
pub use data_objects::PaymentTransition;
pub use ledger_database::{LedgerDatabase, LedgerError};
pub use order_management::OrderManagement;
pub use sales_analytics::{AnalyticsError, SalesAnalytics};
