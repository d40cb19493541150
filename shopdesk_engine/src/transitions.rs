//! Payment status transition rules.
//!
//! | From \ To | unpaid | paid | refunded | cancelled |
//! |-----------|--------|------|----------|-----------|
//! | unpaid    | Err    | Ok   | Err      | Ok        |
//! | paid      | Err    | Err  | Ok       | (1)       |
//! | refunded  | Err    | Err  | Err      | Err       |
//! | cancelled | Err    | Err  | Err      | Err       |
//!
//! (1) Only legal when [`TransitionPolicy::allow_paid_to_cancelled`] is set. It is off by default.
//!
//! Only two kinds of transition carry inventory side effects. A *sale* (`unpaid → paid`) adds the ordered quantities
//! to the `sold` counters, and a *reversal* (`paid → refunded`, and `paid → cancelled` when enabled) takes them back
//! out again and returns the units to stock.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::PaymentStatus::{self, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot move an order's payment status from '{from}' to '{to}'")]
pub struct InvalidTransition {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

/// The inventory side effect that a legal transition carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryEffect {
    /// `sold` goes up by the ordered quantities.
    Sale,
    /// `sold` goes down and `stock` goes up by the ordered quantities.
    Reversal,
}

impl InventoryEffect {
    /// The signed multiplier applied to `sold` counters.
    pub fn sold_sign(&self) -> i64 {
        match self {
            InventoryEffect::Sale => 1,
            InventoryEffect::Reversal => -1,
        }
    }

    /// Whether product stock is restored by this effect.
    pub fn restores_stock(&self) -> bool {
        matches!(self, InventoryEffect::Reversal)
    }
}

impl std::fmt::Display for InventoryEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryEffect::Sale => f.write_str("sale"),
            InventoryEffect::Reversal => f.write_str("reversal"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    pub allow_paid_to_cancelled: bool,
}

impl TransitionPolicy {
    pub fn new(allow_paid_to_cancelled: bool) -> Self {
        Self { allow_paid_to_cancelled }
    }

    /// Returns true if `requested` is reachable from `current` in a single step.
    pub fn validate(&self, current: PaymentStatus, requested: PaymentStatus) -> bool {
        self.allowed_targets(current).contains(&requested)
    }

    /// Like [`Self::validate`], but returns the rejected pair as an error, and the side effect of the transition if
    /// it is legal.
    pub fn check(
        &self,
        current: PaymentStatus,
        requested: PaymentStatus,
    ) -> Result<Option<InventoryEffect>, InvalidTransition> {
        if !self.validate(current, requested) {
            return Err(InvalidTransition { from: current, to: requested });
        }
        Ok(Self::effect_of(current, requested))
    }

    pub fn allowed_targets(&self, current: PaymentStatus) -> &'static [PaymentStatus] {
        match current {
            Unpaid => &[Paid, Cancelled],
            Paid if self.allow_paid_to_cancelled => &[Refunded, Cancelled],
            Paid => &[Refunded],
            Refunded | Cancelled => &[],
        }
    }

    fn effect_of(current: PaymentStatus, requested: PaymentStatus) -> Option<InventoryEffect> {
        match (current, requested) {
            (Unpaid, Paid) => Some(InventoryEffect::Sale),
            (Paid, Refunded | Cancelled) => Some(InventoryEffect::Reversal),
            _ => None,
        }
    }
}
