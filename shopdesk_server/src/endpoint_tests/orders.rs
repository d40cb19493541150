use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use shopdesk_engine::{
    db_types::{
        CategoryId,
        Money,
        Order,
        OrderId,
        OrderItem,
        OrderStatus,
        PaymentInfo,
        PaymentStatus,
        Product,
        ProductId,
        UserId,
    },
    InventoryEffect,
    LedgerError,
    OrderFlowApi,
    TransitionPolicy,
};

use super::helpers::{get_request, post_request, put_request};
use crate::{
    data_objects::ListSettings,
    endpoint_tests::mocks::MockLedger,
    routes::{OrderByIdRoute, OrdersRoute, PlaceOrderRoute, UpdateOrderRoute},
};

#[actix_web::test]
async fn paying_an_order_reconciles_inventory() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().returning(|_| Ok(Some(order(PaymentStatus::Unpaid))));
    ledger.expect_fetch_products().returning(|_| Ok(vec![product(10, 3)]));
    ledger
        .expect_apply_payment_transition()
        .withf(|t| {
            let plan = t.plan.as_ref().expect("A sale must carry a plan");
            t.from == PaymentStatus::Unpaid &&
                t.to == PaymentStatus::Paid &&
                plan.effect == InventoryEffect::Sale &&
                plan.products.len() == 1 &&
                plan.products[0].quantity == 2 &&
                plan.categories[0].category_id == CategoryId(3)
        })
        .times(1)
        .returning(|_| Ok(order(PaymentStatus::Paid)));
    let (status, body) = put_request("/orders/1", r#"{"paymentStatus":"paid"}"#, configure(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_JSON.replace("\"unpaid\"", "\"paid\""));
}

#[actix_web::test]
async fn illegal_transitions_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().returning(|_| Ok(Some(order(PaymentStatus::Paid))));
    ledger.expect_fetch_products().never();
    ledger.expect_apply_payment_transition().never();
    let (status, body) = put_request("/orders/1", r#"{"paymentStatus":"unpaid"}"#, configure(ledger)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Cannot move an order's payment status from 'paid' to 'unpaid'"}"#);
}

#[actix_web::test]
async fn paid_orders_cannot_be_cancelled_by_default() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().returning(|_| Ok(Some(order(PaymentStatus::Paid))));
    ledger.expect_apply_payment_transition().never();
    let (status, _) = put_request("/orders/1", r#"{"paymentStatus":"cancelled"}"#, configure(ledger)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn updating_a_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().returning(|_| Ok(None));
    let (status, body) = put_request("/orders/99", r#"{"paymentStatus":"paid"}"#, configure(ledger)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. order#99 does not exist"}"#);
}

#[actix_web::test]
async fn concurrent_modification_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().returning(|_| Ok(Some(order(PaymentStatus::Unpaid))));
    ledger.expect_fetch_products().returning(|_| Ok(vec![product(10, 3)]));
    ledger.expect_apply_payment_transition().returning(|t| {
        Err(LedgerError::StaleOrderStatus { order_id: t.order_id, expected: t.from })
    });
    let (status, _) = put_request("/orders/1", r#"{"paymentStatus":"paid"}"#, configure(ledger)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn reconciliation_failures_are_server_errors() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().returning(|_| Ok(Some(order(PaymentStatus::Paid))));
    ledger.expect_fetch_products().returning(|_| Ok(vec![product(10, 3)]));
    ledger.expect_apply_payment_transition().returning(|t| {
        Err(LedgerError::ReconciliationFailure { order_id: t.order_id, details: "database is locked".into() })
    });
    let (status, body) = put_request("/orders/1", r#"{"paymentStatus":"refunded"}"#, configure(ledger)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Inventory reconciliation failed for order#1"), "{body}");
}

#[actix_web::test]
async fn fulfilment_only_updates() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().returning(|_| Ok(Some(order(PaymentStatus::Paid))));
    ledger.expect_apply_payment_transition().never();
    ledger.expect_update_order_status().withf(|id, status| *id == OrderId(1) && *status == OrderStatus::Shipped).returning(
        |_, status| {
            let mut order = order(PaymentStatus::Paid);
            order.order_status = status;
            Ok(order)
        },
    );
    let (status, body) = put_request("/orders/1", r#"{"orderStatus":"Shipped"}"#, configure(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""orderStatus":"Shipped""#), "{body}");
}

#[actix_web::test]
async fn malformed_update_requests() {
    let _ = env_logger::try_init().ok();
    let (status, body) = put_request("/orders/1", "{}", configure(MockLedger::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Supply at least one of orderStatus and paymentStatus"}"#);

    let (status, body) = put_request("/orders/1", r#"{"paymentStatus":"settled"}"#, configure(MockLedger::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body"#), "{body}");
}

#[actix_web::test]
async fn non_numeric_order_ids_are_bad_requests() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/abc", configure(MockLedger::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request path"#), "{body}");

    let (status, _) = put_request("/orders/1x", r#"{"paymentStatus":"paid"}"#, configure(MockLedger::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn fetch_order_by_id() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_order().withf(|id| *id == OrderId(1)).returning(|_| Ok(Some(order(PaymentStatus::Unpaid))));
    let (status, body) = get_request("/orders/1", configure(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn list_orders() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_count_orders().returning(|q| {
        assert!(q.page().is_none());
        Ok(7)
    });
    ledger
        .expect_search_orders()
        .withf(|q| q.filters().len() == 1 && q.page().map(|p| (p.limit, p.offset)) == Some((5, 5)))
        .returning(|_| Ok(vec![order(PaymentStatus::Unpaid)]));
    let (status, body) = get_request("/orders?payment_status=unpaid&limit=5&page=2", configure(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!(r#"{{"orders":[{ORDER_JSON}],"total":7}}"#));
}

#[actix_web::test]
async fn list_orders_rejects_unknown_fields() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_search_orders().never();
    let (status, body) = get_request("/orders?password=hunter2", configure(ledger)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Invalid query parameters. Cannot filter or search on field 'password'"}"#);
}

#[actix_web::test]
async fn place_new_order() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger
        .expect_insert_order()
        .withf(|o| o.user_id.as_str() == "alice" && o.order_items.len() == 1 && o.order_items[0].quantity == 2)
        .returning(|_| Ok(order(PaymentStatus::Unpaid)));
    let body = r#"{"userId":"alice","orderItems":[{"productId":10,"quantity":2}]}"#;
    let (status, _) = post_request("/orders", body, configure(ledger)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn placing_an_order_without_stock() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_insert_order().returning(|_| {
        Err(LedgerError::InsufficientStock { product_id: ProductId(10), requested: 2, available: 1 })
    });
    let body = r#"{"userId":"alice","orderItems":[{"productId":10,"quantity":2}]}"#;
    let (status, body) = post_request("/orders", body, configure(ledger)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Not enough stock for product#10"), "{body}");
}

fn configure(ledger: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(ledger, TransitionPolicy::default());
        cfg.service(OrdersRoute::<MockLedger>::new())
            .service(PlaceOrderRoute::<MockLedger>::new())
            .service(OrderByIdRoute::<MockLedger>::new())
            .service(UpdateOrderRoute::<MockLedger>::new())
            .app_data(web::Data::new(ListSettings { page_size: 20 }))
            .app_data(web::Data::new(api));
    }
}

fn order(payment_status: PaymentStatus) -> Order {
    Order {
        id: OrderId(1),
        user_id: UserId::from("alice"),
        shipping_info_id: None,
        order_items: vec![OrderItem {
            product_id: ProductId(10),
            name: "Blue mug".to_string(),
            category_name: "Mugs".to_string(),
            quantity: 2,
            price: Money::from(1500),
            image: None,
        }],
        payment_info: PaymentInfo {
            amount_paid: Money::from(3000),
            type_payment: "card".to_string(),
            account_name: "Alice".to_string(),
            account_number: "4242".to_string(),
        },
        order_status: OrderStatus::Processing,
        payment_status,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn product(id: i64, category: i64) -> Product {
    Product {
        id: ProductId(id),
        name: "Blue mug".to_string(),
        price: Money::from(1500),
        stock: 8,
        sold: 0,
        category_id: CategoryId(category),
        image: None,
        is_active: true,
    }
}

const ORDER_JSON: &str = r#"{"id":1,"userId":"alice","shippingInfoId":null,"orderItems":[{"productId":10,"name":"Blue mug","categoryName":"Mugs","quantity":2,"price":1500,"image":null}],"paymentInfo":{"amountPaid":3000,"typePayment":"card","accountName":"Alice","accountNumber":"4242"},"orderStatus":"Processing","paymentStatus":"unpaid","createdAt":"2024-02-29T13:30:00Z","updatedAt":"2024-02-29T13:30:00Z"}"#;
