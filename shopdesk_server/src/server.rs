use std::time::Duration;

use actix_web::{dev::Server, error, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use shopdesk_engine::{CatalogApi, OrderFlowApi, SalesAnalyticsApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    data_objects::ListSettings,
    errors::ServerError,
    routes::{
        health,
        BuyerStatsRoute,
        OrderByIdRoute,
        OrdersRoute,
        PlaceOrderRoute,
        ProductOrdersRoute,
        ProductRevenueRoute,
        ProductSalesRoute,
        ProductUsageRoute,
        ProductsRoute,
        PurchasingStatsRoute,
        UpdateOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Database is ready at {}", config.database_url);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let policy = config.transition_policy();
    let settings = ListSettings { page_size: config.page_size };
    let ranking_limit = config.ranking_limit;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), policy);
        let analytics_api = SalesAnalyticsApi::new(db.clone()).with_ranking_limit(ranking_limit);
        let catalog_api = CatalogApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("shopdesk::access_log"))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .app_data(web::Data::new(settings))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(analytics_api))
            .app_data(web::Data::new(catalog_api))
            .service(health)
            // Fixed paths must be registered before the `{id}` routes that would otherwise shadow them
            .service(PurchasingStatsRoute::<SqliteDatabase>::new())
            .service(ProductSalesRoute::<SqliteDatabase>::new())
            .service(BuyerStatsRoute::<SqliteDatabase>::new())
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductRevenueRoute::<SqliteDatabase>::new())
            .service(ProductOrdersRoute::<SqliteDatabase>::new())
            .service(ProductUsageRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies are reported with the same `{"error": ...}` payload as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| error::Error::from(ServerError::InvalidRequestBody(err.to_string())))
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| error::Error::from(ServerError::InvalidQuery(err.to_string())))
}

/// A non-numeric id in `/orders/{id}` or `/products/{id}/...` is a bad request, not a missing route.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| error::Error::from(ServerError::InvalidRequestPath(err.to_string())))
}
