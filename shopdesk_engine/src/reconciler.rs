//! Inventory reconciliation
//!
//! When an order moves between `unpaid`, `paid` and `refunded`, the per-product and per-category counters have to be
//! brought in line with the ledger. This module works out *what* has to change; the database backend applies the
//! resulting [`ReconciliationPlan`] as two batched increments, followed by the status write, in a single transaction
//! (see [`crate::LedgerDatabase::apply_payment_transition`]).
//!
//! Planning follows these rules:
//! 1. Quantities are summed per product, so a product that appears on several lines is adjusted once.
//! 2. Each product is posted to its *current* category, looked up from the live product record. The category name
//!    snapshot on the order line is only used for display and analytics.
//! 3. A product that no longer exists is left out of both batches. It is recorded in
//!    [`ReconciliationPlan::skipped`] so that the omission shows up in the logs.
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
};

use serde::{Deserialize, Serialize};

use crate::{
    db_types::{CategoryId, Order, OrderId, OrderItem, Product, ProductId},
    transitions::InventoryEffect,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDelta {
    pub product_id: ProductId,
    pub category_id: CategoryId,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDelta {
    pub category_id: CategoryId,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub order_id: OrderId,
    pub effect: InventoryEffect,
    /// One entry per live product on the order, ordered by product id.
    pub products: Vec<ProductDelta>,
    /// Per-category totals, ordered by category id.
    pub categories: Vec<CategoryDelta>,
    /// Products on the order that could not be resolved against the catalog, with their quantities.
    pub skipped: Vec<(ProductId, i64)>,
}

/// Sums the ordered quantities per product.
pub fn quantities_by_product(items: &[OrderItem]) -> BTreeMap<ProductId, i64> {
    items.iter().fold(BTreeMap::new(), |mut acc, item| {
        *acc.entry(item.product_id).or_insert(0) += item.quantity;
        acc
    })
}

impl ReconciliationPlan {
    /// Build the plan for `order` using the `live` product records. `live` may contain fewer products than the order
    /// references (deleted products), and may contain unrelated products, which are ignored.
    pub fn build(order: &Order, effect: InventoryEffect, live: &[Product]) -> Self {
        let categories_by_product =
            live.iter().map(|p| (p.id, p.category_id)).collect::<HashMap<ProductId, CategoryId>>();
        let mut products = Vec::new();
        let mut skipped = Vec::new();
        let mut category_totals = BTreeMap::<CategoryId, i64>::new();
        for (product_id, quantity) in quantities_by_product(&order.order_items) {
            match categories_by_product.get(&product_id) {
                Some(&category_id) => {
                    products.push(ProductDelta { product_id, category_id, quantity });
                    *category_totals.entry(category_id).or_insert(0) += quantity;
                },
                None => skipped.push((product_id, quantity)),
            }
        }
        let categories = category_totals
            .into_iter()
            .map(|(category_id, quantity)| CategoryDelta { category_id, quantity })
            .collect();
        Self { order_id: order.id, effect, products, categories, skipped }
    }

    /// The signed change to a `sold` counter for the given quantity.
    pub fn sold_delta(&self, quantity: i64) -> i64 {
        self.effect.sold_sign() * quantity
    }

    /// The signed change to a product's `stock` for the given quantity.
    pub fn stock_delta(&self, quantity: i64) -> i64 {
        if self.effect.restores_stock() {
            quantity
        } else {
            0
        }
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|d| d.product_id).collect()
    }

    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|d| d.category_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }
}

impl Display for ReconciliationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} for {}. products: [", self.effect, self.order_id)?;
        let products =
            self.products.iter().map(|d| format!("{}: {}", d.product_id, d.quantity)).collect::<Vec<_>>().join(", ");
        write!(f, "{products}]. categories: [")?;
        let categories =
            self.categories.iter().map(|d| format!("{}: {}", d.category_id, d.quantity)).collect::<Vec<_>>().join(", ");
        write!(f, "{categories}]")?;
        if !self.skipped.is_empty() {
            let skipped = self.skipped.iter().map(|(p, q)| format!("{p}: {q}")).collect::<Vec<_>>().join(", ");
            write!(f, ". skipped: [{skipped}]")?;
        }
        Ok(())
    }
}
