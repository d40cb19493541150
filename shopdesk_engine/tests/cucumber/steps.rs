use std::str::FromStr;

use cucumber::{given, then, when};
use shopdesk_engine::{
    db_types::{Money, NewOrder, NewOrderItem, NewProduct, OrderStatus, OrderUpdate, PaymentStatus, UserId},
    OrderFlowError,
};

use crate::cucumber::ShopWorld;

//--------------------------------------        Catalog        ---------------------------------------------------------
#[given(expr = "a category {string}")]
async fn create_category(world: &mut ShopWorld, name: String) {
    let category = world.system().catalog.create_category(&name).await.expect("Error creating category");
    world.categories.insert(name, category.id);
}

#[given(expr = "a product {string} in {string} priced at {int} with {int} in stock")]
async fn create_product(world: &mut ShopWorld, name: String, category: String, price: i64, stock: i64) {
    let category_id = world.category_id(&category);
    let product = NewProduct::new(name.as_str(), Money::from(price), stock, category_id);
    let product = world.system().catalog.create_product(product).await.expect("Error creating product");
    world.products.insert(name, product.id);
}

#[when(expr = "product {string} is moved to {string}")]
async fn move_product(world: &mut ShopWorld, name: String, category: String) {
    let (id, category_id) = (world.product_id(&name), world.category_id(&category));
    world.system().catalog.reclassify_product(id, category_id).await.expect("Error moving product");
}

#[when(expr = "product {string} is deleted")]
async fn delete_product(world: &mut ShopWorld, name: String) {
    let id = world.product_id(&name);
    world.system().catalog.delete_product(id).await.expect("Error deleting product");
}

#[when(expr = "category {string} is deactivated")]
async fn deactivate_category(world: &mut ShopWorld, name: String) {
    let id = world.category_id(&name);
    world.system().catalog.set_category_active(id, false).await.expect("Error deactivating category");
}

//--------------------------------------         Orders        ---------------------------------------------------------
#[when(expr = "{word} orders {int} of {string} as order {word}")]
async fn place_order(world: &mut ShopWorld, user: String, quantity: i64, product: String, label: String) {
    let items = vec![NewOrderItem::new(world.product_id(&product), quantity)];
    submit_order(world, user, items, label).await;
}

#[when(expr = "{word} orders {int} of {string} and {int} of {string} as order {word}")]
async fn place_two_line_order(
    world: &mut ShopWorld,
    user: String,
    q1: i64,
    p1: String,
    q2: i64,
    p2: String,
    label: String,
) {
    let items =
        vec![NewOrderItem::new(world.product_id(&p1), q1), NewOrderItem::new(world.product_id(&p2), q2)];
    submit_order(world, user, items, label).await;
}

async fn submit_order(world: &mut ShopWorld, user: String, items: Vec<NewOrderItem>, label: String) {
    let order = NewOrder::new(UserId::from(user), items);
    let order = world.system().orders.place_order(order).await.expect("Error placing order");
    world.orders.insert(label, order.id);
}

#[when(expr = "order {word} is marked {word}")]
async fn mark_order(world: &mut ShopWorld, label: String, status: String) {
    let status = PaymentStatus::from_str(&status).expect("Not a payment status");
    let update = OrderUpdate::new(world.order_id(&label)).with_payment_status(status);
    world.system().orders.update_order(update).await.expect("Error updating payment status");
}

#[when(expr = "I try to mark order {word} as {word}")]
async fn try_mark_order(world: &mut ShopWorld, label: String, status: String) {
    let status = PaymentStatus::from_str(&status).expect("Not a payment status");
    let update = OrderUpdate::new(world.order_id(&label)).with_payment_status(status);
    world.last_error = world.system().orders.update_order(update).await.err();
}

#[when(expr = "order {word} is {word} by the courier")]
async fn fulfil_order(world: &mut ShopWorld, label: String, status: String) {
    let status = match status.as_str() {
        "shipped" => OrderStatus::Shipped,
        "delivered" => OrderStatus::Delivered,
        s => panic!("Unsupported fulfilment step {s}"),
    };
    let update = OrderUpdate::new(world.order_id(&label)).with_order_status(status);
    world.system().orders.update_order(update).await.expect("Error updating fulfilment status");
}

#[then("the update is rejected as an invalid transition")]
async fn rejected(world: &mut ShopWorld) {
    let err = world.last_error.take().expect("The update was accepted");
    assert!(matches!(err, OrderFlowError::InvalidTransition(_)), "Unexpected error: {err}");
}

#[then(expr = "order {word} has payment status {word}")]
async fn check_payment_status(world: &mut ShopWorld, label: String, status: String) {
    let order = world.system().orders.fetch_order(world.order_id(&label)).await.expect("Error fetching order");
    assert_eq!(order.payment_status.as_str(), status);
}

#[then(expr = "order {word} has fulfilment status {word}")]
async fn check_order_status(world: &mut ShopWorld, label: String, status: String) {
    let order = world.system().orders.fetch_order(world.order_id(&label)).await.expect("Error fetching order");
    assert_eq!(order.order_status.as_str(), status);
}

//--------------------------------------       Inventory       ---------------------------------------------------------
#[then(expr = "product {string} has sold {int} with {int} in stock")]
async fn check_product(world: &mut ShopWorld, name: String, sold: i64, stock: i64) {
    let product = world.system().catalog.fetch_product(world.product_id(&name)).await.expect("Error fetching product");
    assert_eq!((product.sold, product.stock), (sold, stock), "sold/stock for {name}");
}

#[then(expr = "category {string} has sold {int}")]
async fn check_category(world: &mut ShopWorld, name: String, sold: i64) {
    let category =
        world.system().catalog.fetch_category(world.category_id(&name)).await.expect("Error fetching category");
    assert_eq!(category.sold, sold, "sold for {name}");
}

//--------------------------------------       Analytics       ---------------------------------------------------------
/// Rankings are written as `name:amount` pairs, separated by commas.
fn parse_ranking(s: &str) -> Vec<(String, i64)> {
    s.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|pair| {
            let (name, amount) = pair.trim().rsplit_once(':').expect("Expected name:amount");
            (name.to_string(), amount.parse().expect("Not an amount"))
        })
        .collect()
}

#[then(expr = "the product ranking is {string}")]
async fn check_product_ranking(world: &mut ShopWorld, expected: String) {
    let ranking = world.system().analytics.product_sales(None).await.expect("Error fetching ranking");
    let actual = ranking.into_iter().map(|r| (r.name, r.total_amount.value())).collect::<Vec<_>>();
    assert_eq!(actual, parse_ranking(&expected));
}

#[then(expr = "the category ranking is {string}")]
async fn check_category_ranking(world: &mut ShopWorld, expected: String) {
    let ranking = world.system().analytics.category_sales(None).await.expect("Error fetching ranking");
    let actual = ranking.into_iter().map(|r| (r.category, r.total_amount.value())).collect::<Vec<_>>();
    assert_eq!(actual, parse_ranking(&expected));
}

#[then(expr = "the buyers ranked by order count are {string}")]
async fn check_buyers(world: &mut ShopWorld, expected: String) {
    let stats = world.system().analytics.buyer_stats(None).await.expect("Error fetching buyer stats");
    let actual = stats.by_order_count.into_iter().map(|b| (b.user_id.to_string(), b.order_count)).collect::<Vec<_>>();
    assert_eq!(actual, parse_ranking(&expected));
}

#[then(expr = "there are {int} paid and {int} unpaid orders")]
async fn check_status_counts(world: &mut ShopWorld, paid: i64, unpaid: i64) {
    let stats = world.system().analytics.purchasing_stats(None).await.expect("Error fetching stats");
    assert_eq!((stats.counts.paid, stats.counts.unpaid), (paid, unpaid));
}

#[then(expr = "product {string} can no longer be modified")]
async fn check_usage(world: &mut ShopWorld, name: String) {
    let usage = world.system().analytics.product_usage(world.product_id(&name)).await.expect("Error fetching usage");
    assert!(!usage.can_modify);
}
