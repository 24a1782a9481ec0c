//! How an expense moves its bike's purchase price.
//!
//! An expense is either not applied or applied with its amount. Every
//! create, update or delete is a transition between two such states and
//! yields exactly one delta per affected bike, so reversing a change
//! always undoes it once.

use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentState {
    NotApplied,
    Applied { amount: Decimal },
}

impl AdjustmentState {
    pub fn of(amount: Decimal, adjust_bike_price: bool) -> Self {
        if adjust_bike_price {
            AdjustmentState::Applied { amount }
        } else {
            AdjustmentState::NotApplied
        }
    }

    fn applied_amount(self) -> Decimal {
        match self {
            AdjustmentState::NotApplied => Decimal::ZERO,
            AdjustmentState::Applied { amount } => amount,
        }
    }
}

/// Delta to add to the purchase price when moving from `before` to `after`.
pub fn price_delta(before: AdjustmentState, after: AdjustmentState) -> Decimal {
    after.applied_amount() - before.applied_amount()
}

/// A signed change to one bike's purchase price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceAdjustment {
    pub bike_id: Uuid,
    pub delta: Decimal,
}

/// Adjustments for an expense moving from (`before_bike`, `before`) to
/// (`after_bike`, `after`). Pass `NotApplied` on the missing side for
/// create and delete. Zero deltas are dropped.
pub fn plan_adjustments(
    before_bike: Uuid,
    before: AdjustmentState,
    after_bike: Uuid,
    after: AdjustmentState,
) -> Vec<PriceAdjustment> {
    let planned = if before_bike == after_bike {
        vec![PriceAdjustment {
            bike_id: after_bike,
            delta: price_delta(before, after),
        }]
    } else {
        vec![
            PriceAdjustment {
                bike_id: before_bike,
                delta: price_delta(before, AdjustmentState::NotApplied),
            },
            PriceAdjustment {
                bike_id: after_bike,
                delta: price_delta(AdjustmentState::NotApplied, after),
            },
        ]
    };

    planned.into_iter().filter(|a| !a.delta.is_zero()).collect()
}
