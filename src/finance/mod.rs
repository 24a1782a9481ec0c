//! Financial aggregation for the marketplace: partner-share arithmetic,
//! order profit reconciliation, the expense to purchase-price adjustment
//! rules and revenue rollups.
//!
//! Everything in here is pure. Services load records, hand them to these
//! functions and persist or return the results. Currency values are
//! `Decimal` throughout and are rounded to cents only when an output struct
//! is built.

pub mod price_adjustment;
pub mod profit;
pub mod rollups;
pub mod shares;

pub use price_adjustment::{plan_adjustments, price_delta, AdjustmentState, PriceAdjustment};
pub use profit::{net_profit, total_partner_profit, PartnerProfitEntry};
pub use rollups::{
    monthly_revenue, order_stats, MonthlyRevenue, OrderSnapshot, OrderStats, TopPartner,
};
pub use shares::{
    compute_my_share, compute_partner_analytics, compute_share_amount, partner_has_share,
    partner_share_percentage, validate_partner_shares, BikeAnalytics, BikeHolding,
    PartnerAnalytics, PartnerAnalyticsSummary, PartnerShare, ShareError,
};

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(dec!(10)), dec!(10));
        assert_eq!(round2(dec!(33.333333)), dec!(33.33));
        assert_eq!(round2(dec!(66.666666)), dec!(66.67));
        assert_eq!(round2(dec!(-12.346)), dec!(-12.35));
        assert_eq!(round2(dec!(0.125)), dec!(0.13));
    }

    #[test]
    fn percentage_of_guards_zero_denominator() {
        assert_eq!(percentage_of(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percentage_of(dec!(25), dec!(200)), dec!(12.5));
    }

    #[test]
    fn repeated_cent_amounts_add_back_exactly() {
        let start = dec!(0.1);
        let mut price = start;
        for amount in [dec!(0.2), dec!(0.7), dec!(0.1)] {
            price += amount;
        }
        for amount in [dec!(0.2), dec!(0.7), dec!(0.1)] {
            price -= amount;
        }
        assert_eq!(price, start);
        assert_eq!(price.to_string(), "0.1");
    }
}
