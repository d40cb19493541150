use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use shopdesk_engine::{
    analytics_objects::{BuyerRank, CategorySales, ProductOrderRef, ProductSales, SalesWindow, StatusCounts},
    db_types::{Money, OrderId, PaymentStatus, ProductId, UserId},
    AnalyticsError,
    SalesAnalyticsApi,
};

use super::helpers::get_request;
use crate::{
    endpoint_tests::mocks::MockAnalytics,
    routes::{health, BuyerStatsRoute, ProductSalesRoute, ProductUsageRoute, PurchasingStatsRoute},
};

#[actix_web::test]
async fn health_check() {
    let (status, body) = get_request("/health", |cfg: &mut ServiceConfig| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn purchasing_stats_for_a_month() {
    let _ = env_logger::try_init().ok();
    let march = SalesWindow::new(3, 2024).unwrap();
    let mut analytics = MockAnalytics::new();
    analytics.expect_order_counts_by_status().withf(move |w| *w == Some(march)).returning(|_| {
        Ok(StatusCounts { paid: 2, unpaid: 1, processing: 3, shipped: 0, delivered: 0 })
    });
    analytics.expect_category_sales_ranking().withf(move |w, limit| *w == Some(march) && *limit == 10).returning(
        |_, _| Ok(vec![CategorySales { category: "Mugs".into(), total_amount: Money::from(4500), total_quantity: 3 }]),
    );
    let (status, body) = get_request("/orders/purchasingStats?month=3&year=2024", configure(analytics)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"window":{"month":3,"year":2024},"counts":{"paid":2,"unpaid":1,"processing":3,"shipped":0,"delivered":0},"categories":[{"category":"Mugs","totalAmount":4500,"totalQuantity":3}]}"#
    );
}

#[actix_web::test]
async fn incomplete_windows_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut analytics = MockAnalytics::new();
    analytics.expect_order_counts_by_status().never();
    let (status, body) = get_request("/orders/purchasingStats?month=3", configure(analytics)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"Invalid query parameters. Invalid sales window. Both month and year must be supplied"}"#
    );

    let (status, _) = get_request("/products/sales?month=13&year=2024", configure(MockAnalytics::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get_request("/products/sales?month=march&year=2024", configure(MockAnalytics::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn product_sales_all_time() {
    let _ = env_logger::try_init().ok();
    let mut analytics = MockAnalytics::new();
    analytics.expect_product_sales_ranking().withf(|w, limit| w.is_none() && *limit == 10).returning(|_, _| {
        Ok(vec![ProductSales {
            product_id: ProductId(10),
            total_amount: Money::from(4500),
            total_quantity: 3,
            name: "Blue mug".into(),
            category: "Mugs".into(),
            image: None,
        }])
    });
    let (status, body) = get_request("/products/sales", configure(analytics)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"productId":10,"totalAmount":4500,"totalQuantity":3,"name":"Blue mug","category":"Mugs","image":null}]"#
    );
}

#[actix_web::test]
async fn buyer_stats_default_to_all_time_and_this_month() {
    let _ = env_logger::try_init().ok();
    let mut analytics = MockAnalytics::new();
    analytics
        .expect_buyers_by_order_count()
        .withf(|w, _| w.is_none())
        .returning(|_, _| Ok(vec![rank("alice", 3, 4500), rank("bob", 1, 9000)]));
    analytics
        .expect_buyers_by_amount_paid()
        .withf(|w, _| *w == Some(SalesWindow::current()))
        .returning(|_, _| Ok(vec![rank("bob", 1, 9000)]));
    let (status, body) = get_request("/users/purchasingStats", configure(analytics)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"window":null,"byOrderCount":[{"userId":"alice","orderCount":3,"totalAmount":4500},{"userId":"bob","orderCount":1,"totalAmount":9000}],"byAmountPaid":[{"userId":"bob","orderCount":1,"totalAmount":9000}]}"#
    );
}

#[actix_web::test]
async fn product_usage_blocks_sold_products() {
    let _ = env_logger::try_init().ok();
    let mut analytics = MockAnalytics::new();
    analytics.expect_orders_containing_product().withf(|id| *id == ProductId(10)).returning(|_| {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Ok(vec![
            ProductOrderRef { order_id: OrderId(1), date, payment_status: PaymentStatus::Refunded },
            ProductOrderRef { order_id: OrderId(2), date, payment_status: PaymentStatus::Paid },
        ])
    });
    let (status, body) = get_request("/products/10/usage", configure(analytics)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"productId":10,"orderCount":2,"paidOrderCount":1,"canModify":false}"#);
}

#[actix_web::test]
async fn backend_failures_are_server_errors() {
    let _ = env_logger::try_init().ok();
    let mut analytics = MockAnalytics::new();
    analytics
        .expect_product_sales_ranking()
        .returning(|_, _| Err(AnalyticsError::DatabaseError("disk I/O error".into())));
    let (status, body) = get_request("/products/sales", configure(analytics)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"An error occurred on the backend of the server. disk I/O error"}"#);
}

fn rank(user: &str, order_count: i64, total: i64) -> BuyerRank {
    BuyerRank { user_id: UserId::from(user), order_count, total_amount: Money::from(total) }
}

fn configure(analytics: MockAnalytics) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = SalesAnalyticsApi::new(analytics).with_ranking_limit(10);
        cfg.service(PurchasingStatsRoute::<MockAnalytics>::new())
            .service(ProductSalesRoute::<MockAnalytics>::new())
            .service(BuyerStatsRoute::<MockAnalytics>::new())
            .service(ProductUsageRoute::<MockAnalytics>::new())
            .app_data(web::Data::new(api));
    }
}
