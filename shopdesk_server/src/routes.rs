//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: they unpack the request, call into one of the
//! engine APIs and serialise the result. Anything longer belongs in the engine.
//!
//! The handlers are generic over the database backend so that they can be exercised against mocks. Since actix
//! cannot register generic handlers directly, each one gets a route type generated by the `route!` macro, e.g.
//! `UpdateOrderRoute::<SqliteDatabase>::new()`.
use std::collections::HashMap;

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shopdesk_engine::{
    db_types::{NewOrder, OrderId, ProductId},
    list_query::ListQuery,
    CatalogApi,
    CatalogManagement,
    LedgerDatabase,
    OrderFlowApi,
    OrderManagement,
    SalesAnalytics,
    SalesAnalyticsApi,
};

use crate::{
    data_objects::{ListSettings, OrderList, ProductList, UpdateOrderParams, WindowParams},
    errors::ServerError,
};

/// Fields that `GET /orders` may filter on.
pub const ORDER_FILTER_FIELDS: [&str; 4] = ["user_id", "payment_status", "order_status", "amount_paid"];
pub const ORDER_SEARCH_FIELDS: [&str; 2] = ["user_id", "account_name"];
/// Fields that `GET /products` may filter on.
pub const PRODUCT_FILTER_FIELDS: [&str; 5] = ["price", "stock", "sold", "category_id", "is_active"];
pub const PRODUCT_SEARCH_FIELDS: [&str; 1] = ["name"];

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(update_order => Put "/orders/{id}" impl LedgerDatabase, OrderManagement, CatalogManagement);
/// Move an order along its lifecycle.
///
/// The body is `{"paymentStatus": "...", "orderStatus": "..."}`, where either field may be left out. A payment status
/// change is validated against the transition table and, for sales and refunds, reconciled against product and
/// category inventory in the same transaction.
///
/// Responds with the updated order, or
/// * 400 if the payment status cannot be reached from the current one,
/// * 404 if the order does not exist,
/// * 409 if another request changed the order's payment status first,
/// * 500 if the inventory could not be reconciled. The order is left unchanged in this case.
pub async fn update_order<B>(
    path: web::Path<i64>,
    body: web::Json<UpdateOrderParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + OrderManagement + CatalogManagement,
{
    let order_id = OrderId::from(path.into_inner());
    let update = body.into_inner().into_update(order_id)?;
    debug!("💻️ PUT order update for {order_id}: {update:?}");
    let order = api.update_order(update).await.map_err(|e| {
        debug!("💻️ Could not update {order_id}. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

route!(place_order => Post "/orders" impl LedgerDatabase, OrderManagement, CatalogManagement);
pub async fn place_order<B>(
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + OrderManagement + CatalogManagement,
{
    let order = api.place_order(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(orders => Get "/orders" impl LedgerDatabase, OrderManagement, CatalogManagement);
/// Lists orders, newest first.
///
/// Supports `keyword` (matched against the user id and account name), `page`, `limit` and filters on
/// [`ORDER_FILTER_FIELDS`], e.g. `?payment_status=paid&amount_paid[gte]=1000`.
pub async fn orders<B>(
    query: web::Query<HashMap<String, String>>,
    settings: web::Data<ListSettings>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + OrderManagement + CatalogManagement,
{
    let query = ListQuery::new(query.into_inner()).search(&ORDER_SEARCH_FIELDS).filter(&ORDER_FILTER_FIELDS)?;
    debug!("💻️ GET orders for [{query}]");
    let total = api.count_orders(query.clone()).await?;
    let orders = api.search_orders(query.pagination(settings.page_size)).await?;
    Ok(HttpResponse::Ok().json(OrderList { orders, total }))
}

route!(order_by_id => Get "/orders/{id}" impl LedgerDatabase, OrderManagement, CatalogManagement);
pub async fn order_by_id<B>(path: web::Path<i64>, api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError>
where B: LedgerDatabase + OrderManagement + CatalogManagement {
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ GET order {order_id}");
    let order = api.fetch_order(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Dashboards  ----------------------------------------------------
route!(purchasing_stats => Get "/orders/purchasingStats" impl SalesAnalytics);
/// Order counts by payment and fulfilment status, and the category sales ranking. `?month=&year=` restricts both to
/// one calendar month.
pub async fn purchasing_stats<B: SalesAnalytics>(
    params: web::Query<WindowParams>,
    api: web::Data<SalesAnalyticsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let window = params.window()?;
    let stats = api.purchasing_stats(window).await?;
    Ok(HttpResponse::Ok().json(stats))
}

route!(product_sales => Get "/products/sales" impl SalesAnalytics);
pub async fn product_sales<B: SalesAnalytics>(
    params: web::Query<WindowParams>,
    api: web::Data<SalesAnalyticsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let window = params.window()?;
    let ranking = api.product_sales(window).await?;
    Ok(HttpResponse::Ok().json(ranking))
}

route!(buyer_stats => Get "/users/purchasingStats" impl SalesAnalytics);
/// The buyer rankings: by number of paid orders, and by amount paid.
///
/// Without `?month=&year=`, the order-count ranking covers all time and the amount ranking covers the current month.
pub async fn buyer_stats<B: SalesAnalytics>(
    params: web::Query<WindowParams>,
    api: web::Data<SalesAnalyticsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let window = params.window()?;
    let stats = api.buyer_stats(window).await?;
    Ok(HttpResponse::Ok().json(stats))
}

route!(product_revenue => Get "/products/{id}/revenue" impl SalesAnalytics);
pub async fn product_revenue<B: SalesAnalytics>(
    path: web::Path<i64>,
    api: web::Data<SalesAnalyticsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let points = api.revenue_for_product(ProductId::from(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(points))
}

route!(product_orders => Get "/products/{id}/orders" impl SalesAnalytics);
pub async fn product_orders<B: SalesAnalytics>(
    path: web::Path<i64>,
    api: web::Data<SalesAnalyticsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.orders_containing_product(ProductId::from(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(product_usage => Get "/products/{id}/usage" impl SalesAnalytics);
/// Whether a product may still be edited or deleted. Products that appear on a paid order may not.
pub async fn product_usage<B: SalesAnalytics>(
    path: web::Path<i64>,
    api: web::Data<SalesAnalyticsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let usage = api.product_usage(ProductId::from(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(usage))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
/// Lists products. Supports `keyword` (matched against the name), `page`, `limit` and filters on
/// [`PRODUCT_FILTER_FIELDS`].
pub async fn products<B: CatalogManagement>(
    query: web::Query<HashMap<String, String>>,
    settings: web::Data<ListSettings>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = ListQuery::new(query.into_inner())
        .search(&PRODUCT_SEARCH_FIELDS)
        .filter(&PRODUCT_FILTER_FIELDS)?
        .pagination(settings.page_size);
    debug!("💻️ GET products for [{query}]");
    let products = api.search_products(query).await?;
    Ok(HttpResponse::Ok().json(ProductList { products }))
}
