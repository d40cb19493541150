//! # Shopdesk server
//! The HTTP surface of the Shopdesk admin backend. It exposes the order payment lifecycle, the sales dashboards and
//! a couple of list endpoints on top of [`shopdesk_engine`].
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `GET /health`: returns a 200 OK response.
//! * `PUT /orders/{id}`: change an order's payment and/or fulfilment status.
//! * `POST /orders`, `GET /orders`, `GET /orders/{id}`: place, list and fetch orders.
//! * `GET /orders/purchasingStats`, `GET /products/sales`, `GET /users/purchasingStats`: the sales dashboards.
//! * `GET /products`, `GET /products/{id}/revenue`, `GET /products/{id}/orders`, `GET /products/{id}/usage`:
//!   catalog listings and per-product history.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
