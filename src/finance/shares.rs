use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{percentage_of, round2};
use crate::entities::{bike, BikeStatus};

/// One partner's stake in a bike, in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartnerShare {
    pub partner_id: Uuid,
    pub percentage: Decimal,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ShareError {
    #[error("Partner {partner_id} has percentage {percentage}, which must be between 0 and 100")]
    PercentageOutOfRange {
        partner_id: Uuid,
        percentage: Decimal,
    },
    #[error("Partner {0} is listed more than once")]
    DuplicatePartner(Uuid),
    #[error("Partner percentages add up to {0}%, which exceeds 100%")]
    TotalExceeded(Decimal),
}

/// `total * percentage / 100`
pub fn compute_share_amount(total: Decimal, percentage: Decimal) -> Decimal {
    total * percentage / Decimal::ONE_HUNDRED
}

/// Checks a bike's partner list before it is written.
pub fn validate_partner_shares(shares: &[PartnerShare]) -> Result<(), ShareError> {
    let mut seen = HashSet::with_capacity(shares.len());
    let mut total = Decimal::ZERO;

    for share in shares {
        if share.percentage < Decimal::ZERO || share.percentage > Decimal::ONE_HUNDRED {
            return Err(ShareError::PercentageOutOfRange {
                partner_id: share.partner_id,
                percentage: share.percentage,
            });
        }
        if !seen.insert(share.partner_id) {
            return Err(ShareError::DuplicatePartner(share.partner_id));
        }
        total += share.percentage;
    }

    if total > Decimal::ONE_HUNDRED {
        return Err(ShareError::TotalExceeded(total));
    }
    Ok(())
}

/// The owner's share of `price` once every partner has taken theirs.
pub fn compute_my_share(price: Decimal, shares: &[PartnerShare]) -> Decimal {
    let partners_total: Decimal = shares.iter().map(|s| s.percentage).sum();
    price * (Decimal::ONE_HUNDRED - partners_total) / Decimal::ONE_HUNDRED
}

/// The partner's percentage in this list, 0 when absent.
pub fn partner_share_percentage(shares: &[PartnerShare], partner_id: Uuid) -> Decimal {
    shares
        .iter()
        .find(|s| s.partner_id == partner_id)
        .map(|s| s.percentage)
        .unwrap_or(Decimal::ZERO)
}

pub fn partner_has_share(shares: &[PartnerShare], partner_id: Uuid) -> bool {
    partner_share_percentage(shares, partner_id) > Decimal::ZERO
}

/// A bike together with its partner stakes
#[derive(Debug, Clone)]
pub struct BikeHolding {
    pub bike: bike::Model,
    pub shares: Vec<PartnerShare>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeAnalytics {
    pub bike_id: Uuid,
    pub bike_name: String,
    pub brand: String,
    pub model: String,
    pub price: Decimal,
    pub status: BikeStatus,
    pub share_percentage: Decimal,
    pub share_amount: Decimal,
    /// Share value, counted only once the bike is sold
    pub earnings: Decimal,
    pub investment: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAnalyticsSummary {
    pub total_bikes: u64,
    pub sold_bikes: u64,
    pub active_bikes: u64,
    pub total_earnings: Decimal,
    pub total_investment: Decimal,
    pub total_profit: Decimal,
    pub average_share_percentage: Decimal,
    pub average_earnings_per_bike: Decimal,
    pub profit_margin: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAnalytics {
    pub summary: PartnerAnalyticsSummary,
    pub bike_analytics: Vec<BikeAnalytics>,
}

/// Aggregates a partner's position across the bikes they hold a stake in.
///
/// Bikes the partner is not listed on are skipped. Earnings count the full
/// share amount of sold bikes while investment counts it for every bike, so
/// a sold bike nets to zero profit.
pub fn compute_partner_analytics(holdings: &[BikeHolding], partner_id: Uuid) -> PartnerAnalytics {
    let mut bike_analytics = Vec::new();
    let mut sold_bikes = 0u64;
    let mut active_bikes = 0u64;
    let mut total_earnings = Decimal::ZERO;
    let mut total_investment = Decimal::ZERO;
    let mut total_percentage = Decimal::ZERO;

    for holding in holdings {
        let Some(share) = holding
            .shares
            .iter()
            .find(|s| s.partner_id == partner_id)
        else {
            continue;
        };

        let bike = &holding.bike;
        let share_amount = compute_share_amount(bike.price, share.percentage);
        let sold = bike.status == BikeStatus::Sold;
        let earnings = if sold { share_amount } else { Decimal::ZERO };
        let investment = share_amount;

        if sold {
            sold_bikes += 1;
        }
        if bike.status.is_public() {
            active_bikes += 1;
        }
        total_earnings += earnings;
        total_investment += investment;
        total_percentage += share.percentage;

        bike_analytics.push(BikeAnalytics {
            bike_id: bike.id,
            bike_name: bike.name.clone(),
            brand: bike.brand.clone(),
            model: bike.model.clone(),
            price: round2(bike.price),
            status: bike.status,
            share_percentage: round2(share.percentage),
            share_amount: round2(share_amount),
            earnings: round2(earnings),
            investment: round2(investment),
            profit: round2(earnings - investment),
        });
    }

    let total_bikes = bike_analytics.len() as u64;
    let total_profit = total_earnings - total_investment;
    let average_share_percentage = if total_bikes == 0 {
        Decimal::ZERO
    } else {
        total_percentage / Decimal::from(total_bikes)
    };
    let average_earnings_per_bike = if sold_bikes == 0 {
        Decimal::ZERO
    } else {
        total_earnings / Decimal::from(sold_bikes)
    };

    PartnerAnalytics {
        summary: PartnerAnalyticsSummary {
            total_bikes,
            sold_bikes,
            active_bikes,
            total_earnings: round2(total_earnings),
            total_investment: round2(total_investment),
            total_profit: round2(total_profit),
            average_share_percentage: round2(average_share_percentage),
            average_earnings_per_bike: round2(average_earnings_per_bike),
            profit_margin: round2(percentage_of(total_profit, total_investment)),
        },
        bike_analytics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn share(partner_id: Uuid, percentage: Decimal) -> PartnerShare {
        PartnerShare {
            partner_id,
            percentage,
        }
    }

    fn bike(price: Decimal, status: BikeStatus) -> bike::Model {
        let now = Utc::now();
        bike::Model {
            id: Uuid::new_v4(),
            name: "Street Triple".into(),
            brand: "Triumph".into(),
            model: "RS".into(),
            year: 2021,
            mileage: 8_000,
            description: None,
            image_url: None,
            price,
            purchase_price: price * dec!(0.8),
            my_share: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn share_amount_is_plain_percentage() {
        assert_eq!(compute_share_amount(dec!(10000), dec!(25)), dec!(2500));
        assert_eq!(compute_share_amount(dec!(0), dec!(40)), dec!(0));
    }

    #[test]
    fn my_share_without_partners_is_full_price() {
        assert_eq!(compute_my_share(dec!(1000), &[]), dec!(1000));
        assert_eq!(compute_my_share(dec!(1000), &[share(Uuid::new_v4(), dec!(30))]), dec!(700));
    }

    #[test]
    fn shares_over_one_hundred_percent_are_rejected() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            validate_partner_shares(&[share(a, dec!(60)), share(b, dec!(50))]),
            Err(ShareError::TotalExceeded(dec!(110)))
        );
        assert!(validate_partner_shares(&[share(a, dec!(60)), share(b, dec!(40))]).is_ok());
        assert!(validate_partner_shares(&[]).is_ok());
    }

    #[test]
    fn thirds_that_sum_to_one_hundred_are_accepted() {
        let shares = [
            share(Uuid::new_v4(), dec!(33.3)),
            share(Uuid::new_v4(), dec!(33.3)),
            share(Uuid::new_v4(), dec!(33.4)),
        ];
        assert!(validate_partner_shares(&shares).is_ok());

        let over = [
            share(Uuid::new_v4(), dec!(33.4)),
            share(Uuid::new_v4(), dec!(33.4)),
            share(Uuid::new_v4(), dec!(33.4)),
        ];
        assert_eq!(
            validate_partner_shares(&over),
            Err(ShareError::TotalExceeded(dec!(100.2)))
        );
    }

    #[test]
    fn out_of_range_and_duplicate_shares_are_rejected() {
        let a = Uuid::new_v4();
        assert!(matches!(
            validate_partner_shares(&[share(a, dec!(120))]),
            Err(ShareError::PercentageOutOfRange { .. })
        ));
        assert!(matches!(
            validate_partner_shares(&[share(a, dec!(-1))]),
            Err(ShareError::PercentageOutOfRange { .. })
        ));
        assert_eq!(
            validate_partner_shares(&[share(a, dec!(10)), share(a, dec!(20))]),
            Err(ShareError::DuplicatePartner(a))
        );
    }

    #[test]
    fn missing_partner_has_zero_share() {
        let a = Uuid::new_v4();
        let shares = [share(a, dec!(15))];
        assert_eq!(partner_share_percentage(&shares, a), dec!(15));
        assert_eq!(partner_share_percentage(&shares, Uuid::new_v4()), dec!(0));
        assert!(partner_has_share(&shares, a));
        assert!(!partner_has_share(&[share(a, dec!(0))], a));
    }

    #[test]
    fn sold_bike_earnings_cancel_investment() {
        let partner = Uuid::new_v4();
        let holdings = vec![BikeHolding {
            bike: bike(dec!(10000), BikeStatus::Sold),
            shares: vec![share(partner, dec!(25))],
        }];

        let analytics = compute_partner_analytics(&holdings, partner);
        let row = &analytics.bike_analytics[0];
        assert_eq!(row.share_amount, dec!(2500));
        assert_eq!(row.earnings, dec!(2500));
        assert_eq!(row.profit, dec!(0));
        assert_eq!(analytics.summary.profit_margin, dec!(0));
        assert_eq!(analytics.summary.sold_bikes, 1);
        assert_eq!(analytics.summary.average_earnings_per_bike, dec!(2500));
    }

    #[test]
    fn unsold_bikes_count_as_investment_only() {
        let partner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let holdings = vec![
            BikeHolding {
                bike: bike(dec!(10000), BikeStatus::Available),
                shares: vec![share(partner, dec!(20))],
            },
            BikeHolding {
                bike: bike(dec!(6000), BikeStatus::Active),
                shares: vec![share(partner, dec!(30)), share(other, dec!(10))],
            },
            BikeHolding {
                bike: bike(dec!(4000), BikeStatus::Active),
                shares: vec![share(other, dec!(50))],
            },
        ];

        let summary = compute_partner_analytics(&holdings, partner).summary;
        assert_eq!(summary.total_bikes, 2);
        assert_eq!(summary.active_bikes, 2);
        assert_eq!(summary.sold_bikes, 0);
        assert_eq!(summary.total_earnings, dec!(0));
        assert_eq!(summary.total_investment, dec!(3800));
        assert_eq!(summary.total_profit, dec!(-3800));
        assert_eq!(summary.profit_margin, dec!(-100));
        assert_eq!(summary.average_share_percentage, dec!(25));
        assert_eq!(summary.average_earnings_per_bike, dec!(0));
    }

    #[test]
    fn partner_without_bikes_gets_zeroed_summary() {
        let analytics = compute_partner_analytics(&[], Uuid::new_v4());
        assert!(analytics.bike_analytics.is_empty());
        assert_eq!(analytics.summary.total_bikes, 0);
        assert_eq!(analytics.summary.profit_margin, dec!(0));
        assert_eq!(analytics.summary.average_share_percentage, dec!(0));
    }
}
