//! # Shopdesk engine public API
//!
//! The `ledger_api` module exposes the programmatic API of the engine. The API is modular, so that clients can pick
//! the parts they need.
//!
//! * [`order_flow_api`] places orders and drives them through the payment lifecycle, reconciling inventory on the way.
//! * [`analytics_api`] builds the sales, buyer and status dashboards from the order ledger.
//! * [`catalog_api`] provides the small amount of product and category management the other two rely on.
//!
//! The other submodules are support types.
//!
//! # API usage
//!
//! Every API instance is created by supplying a database backend that implements the backend traits it needs:
//!
//! ```rust,ignore
//! use shopdesk_engine::{OrderFlowApi, SqliteDatabase, TransitionPolicy};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = OrderFlowApi::new(db, TransitionPolicy::default());
//! let order = api.update_order(OrderUpdate::new(order_id).with_payment_status(PaymentStatus::Paid)).await?;
//! ```

pub mod analytics_api;
pub mod analytics_objects;
pub mod catalog_api;
pub mod errors;
pub mod list_query;
pub mod order_flow_api;
