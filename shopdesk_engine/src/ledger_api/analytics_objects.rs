use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shopdesk_common::Money;
use sqlx::FromRow;

use crate::{
    db_types::{OrderId, PaymentStatus, ProductId, UserId},
    traits::AnalyticsError,
};

pub const DEFAULT_RANKING_LIMIT: u32 = 50;

//--------------------------------------     SalesWindow       ---------------------------------------------------------
/// A single calendar month (UTC). Analytics queries without a window cover the whole ledger.
///
/// The window is half-open: `[start of month, start of next month)`, so an order placed at 23:59:59 on the last day
/// of the month belongs to that month, and one placed at midnight belongs to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesWindow {
    month: u32,
    year: i32,
}

impl SalesWindow {
    pub fn new(month: u32, year: i32) -> Result<Self, AnalyticsError> {
        if !(1..=12).contains(&month) {
            return Err(AnalyticsError::InvalidWindow(format!("{month} is not a valid month")));
        }
        if !(1970..=9998).contains(&year) {
            return Err(AnalyticsError::InvalidWindow(format!("{year} is not a supported year")));
        }
        Ok(Self { month, year })
    }

    /// The window containing the given instant.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self { month: instant.month(), year: instant.year() }
    }

    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    /// Builds an optional window from optional query parameters. Both or neither must be given.
    pub fn from_parts(month: Option<u32>, year: Option<i32>) -> Result<Option<Self>, AnalyticsError> {
        match (month, year) {
            (Some(m), Some(y)) => Self::new(m, y).map(Some),
            (None, None) => Ok(None),
            _ => Err(AnalyticsError::InvalidWindow("Both month and year must be supplied".to_string())),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { month: 1, year: self.year + 1 }
        } else {
            Self { month: self.month + 1, year: self.year }
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        first_instant_of(self.year, self.month)
    }

    /// The first instant that is *not* in the window.
    pub fn end(&self) -> DateTime<Utc> {
        let next = self.next();
        first_instant_of(next.year, next.month)
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start() && *instant < self.end()
    }
}

fn first_instant_of(year: i32, month: u32) -> DateTime<Utc> {
    // month and year are range-checked on construction, so the date always exists
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl std::fmt::Display for SalesWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

//--------------------------------------     Result rows       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: ProductId,
    pub total_amount: Money,
    pub total_quantity: i64,
    pub name: String,
    pub category: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    /// The category name as recorded on the order lines
    pub category: String,
    pub total_amount: Money,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerRank {
    pub user_id: UserId,
    pub order_count: i64,
    pub total_amount: Money,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub paid: i64,
    pub unpaid: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub date: DateTime<Utc>,
    pub quantity: i64,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrderRef {
    pub order_id: OrderId,
    pub date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
}

//--------------------------------------     Composites        ---------------------------------------------------------
/// Whether a product can still be edited or deleted without disturbing historical sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUsage {
    pub product_id: ProductId,
    pub order_count: usize,
    pub paid_order_count: usize,
    pub can_modify: bool,
}

impl ProductUsage {
    pub fn from_orders(product_id: ProductId, orders: &[ProductOrderRef]) -> Self {
        let paid_order_count = orders.iter().filter(|o| o.payment_status == PaymentStatus::Paid).count();
        Self { product_id, order_count: orders.len(), paid_order_count, can_modify: paid_order_count == 0 }
    }
}

/// Payload for the order dashboard: status counts plus the category ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasingStats {
    pub window: Option<SalesWindow>,
    pub counts: StatusCounts,
    pub categories: Vec<CategorySales>,
}

/// Payload for the buyer dashboard. `by_order_count` is ranked by number of paid orders and `by_amount_paid` by total
/// amount paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerStats {
    pub window: Option<SalesWindow>,
    pub by_order_count: Vec<BuyerRank>,
    pub by_amount_paid: Vec<BuyerRank>,
}
