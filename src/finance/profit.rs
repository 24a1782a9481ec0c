use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::purchase_order_partner_profit;

/// A partner's cut of one sale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerProfitEntry {
    pub partner_id: Uuid,
    pub profit: Decimal,
    #[serde(default)]
    pub share_percentage: Decimal,
}

impl From<&purchase_order_partner_profit::Model> for PartnerProfitEntry {
    fn from(row: &purchase_order_partner_profit::Model) -> Self {
        Self {
            partner_id: row.partner_id,
            profit: row.profit,
            share_percentage: row.share_percentage,
        }
    }
}

pub fn total_partner_profit(entries: &[PartnerProfitEntry]) -> Decimal {
    entries.iter().map(|e| e.profit).sum()
}

/// Gross profit less everything paid out to partners.
pub fn net_profit(profit: Decimal, entries: &[PartnerProfitEntry]) -> Decimal {
    profit - total_partner_profit(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(profit: Decimal) -> PartnerProfitEntry {
        PartnerProfitEntry {
            partner_id: Uuid::new_v4(),
            profit,
            share_percentage: Decimal::ZERO,
        }
    }

    #[test]
    fn net_profit_subtracts_partner_payouts() {
        assert_eq!(net_profit(dec!(1000), &[entry(dec!(300))]), dec!(700));
        assert_eq!(net_profit(dec!(1000), &[entry(dec!(300)), entry(dec!(150))]), dec!(550));
    }

    #[test]
    fn no_partners_keeps_gross_profit() {
        assert_eq!(total_partner_profit(&[]), dec!(0));
        assert_eq!(net_profit(dec!(420), &[]), dec!(420));
    }

    #[test]
    fn partner_payouts_may_exceed_profit() {
        assert_eq!(net_profit(dec!(100), &[entry(dec!(250))]), dec!(-150));
    }
}
