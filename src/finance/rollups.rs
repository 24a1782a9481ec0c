use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use super::profit::{net_profit, total_partner_profit, PartnerProfitEntry};
use super::{percentage_of, round2};
use crate::entities::{purchase_order, purchase_order_partner_profit, OrderStatus, PaymentStatus};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const TOP_PARTNER_LIMIT: usize = 5;
const TREND_MONTHS: i32 = 12;

/// The parts of an order that the rollups read
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    pub amount: Decimal,
    pub profit: Decimal,
    pub partner_profits: Vec<PartnerProfitEntry>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderSnapshot {
    pub fn new(
        order: &purchase_order::Model,
        partner_profits: &[purchase_order_partner_profit::Model],
    ) -> Self {
        Self {
            amount: order.amount,
            profit: order.profit,
            partner_profits: partner_profits.iter().map(PartnerProfitEntry::from).collect(),
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
        }
    }

    fn partner_profit(&self) -> Decimal {
        total_partner_profit(&self.partner_profits)
    }

    fn net_profit(&self) -> Decimal {
        net_profit(self.profit, &self.partner_profits)
    }

    fn is_confirmed(&self) -> bool {
        self.status == OrderStatus::Confirmed
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthRevenue {
    /// Three-letter month name
    pub month: String,
    pub orders: u64,
    pub revenue: Decimal,
    /// Net profit kept after partner payouts
    pub admin_profit: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub year: i32,
    pub months: Vec<MonthRevenue>,
}

/// Confirmed orders of `year` bucketed by the calendar month their
/// creation time falls in, as seen from `tz`. Always twelve entries.
pub fn monthly_revenue<Tz: TimeZone>(
    orders: &[OrderSnapshot],
    year: i32,
    tz: &Tz,
) -> MonthlyRevenue {
    let mut buckets = [(0u64, Decimal::ZERO, Decimal::ZERO); 12];

    for order in orders.iter().filter(|o| o.is_confirmed()) {
        let local = order.created_at.with_timezone(tz);
        if local.year() != year {
            continue;
        }
        let bucket = &mut buckets[local.month0() as usize];
        bucket.0 += 1;
        bucket.1 += order.amount;
        bucket.2 += order.net_profit();
    }

    let months = MONTH_NAMES
        .iter()
        .zip(buckets.iter())
        .map(|(name, (count, revenue, admin_profit))| MonthRevenue {
            month: (*name).to_string(),
            orders: *count,
            revenue: round2(*revenue),
            admin_profit: round2(*admin_profit),
        })
        .collect();

    MonthlyRevenue { year, months }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: u64,
    pub confirmed: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusCounts {
    pub pending: u64,
    pub partial: u64,
    pub paid: u64,
    pub refunded: u64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderOverview {
    pub total_orders: u64,
    pub by_status: StatusCounts,
    pub by_payment_status: PaymentStatusCounts,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub orders: u64,
    pub revenue: Decimal,
    pub gross_profit: Decimal,
    pub partner_profit: Decimal,
    pub net_profit: Decimal,
    /// Gross profit as a percentage of revenue
    pub profit_margin: Decimal,
    pub net_profit_margin: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialBreakdown {
    pub overall: FinancialSummary,
    pub confirmed: FinancialSummary,
    /// Orders created within the stats period
    pub recent: FinancialSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPartner {
    pub partner_id: Uuid,
    /// Filled in by the caller, which knows the partner records
    pub partner_name: Option<String>,
    pub total_profit: Decimal,
    pub order_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub orders: u64,
    pub revenue: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub period_days: i64,
    pub overview: OrderOverview,
    pub financial: FinancialBreakdown,
    pub top_partners: Vec<TopPartner>,
    pub monthly_trends: Vec<MonthlyTrend>,
}

#[derive(Default)]
struct Totals {
    orders: u64,
    revenue: Decimal,
    gross_profit: Decimal,
    partner_profit: Decimal,
}

impl Totals {
    fn add(&mut self, order: &OrderSnapshot) {
        self.orders += 1;
        self.revenue += order.amount;
        self.gross_profit += order.profit;
        self.partner_profit += order.partner_profit();
    }

    fn summary(&self) -> FinancialSummary {
        let net = self.gross_profit - self.partner_profit;
        FinancialSummary {
            orders: self.orders,
            revenue: round2(self.revenue),
            gross_profit: round2(self.gross_profit),
            partner_profit: round2(self.partner_profit),
            net_profit: round2(net),
            profit_margin: round2(percentage_of(self.gross_profit, self.revenue)),
            net_profit_margin: round2(percentage_of(net, self.revenue)),
        }
    }
}

/// Dashboard statistics over every order.
///
/// `recent` covers orders created in the `period_days` days before `now`.
/// Monthly trends cover the twelve calendar months ending with the month
/// of `now` in `tz`, confirmed orders only.
pub fn order_stats<Tz: TimeZone>(
    orders: &[OrderSnapshot],
    now: DateTime<Utc>,
    period_days: i64,
    tz: &Tz,
) -> OrderStats {
    let mut overview = OrderOverview::default();
    let mut overall = Totals::default();
    let mut confirmed = Totals::default();
    let mut recent = Totals::default();
    let since = now - Duration::days(period_days);

    // insertion order is kept so ties rank by first appearance
    let mut partner_index: HashMap<Uuid, usize> = HashMap::new();
    let mut partners: Vec<(Uuid, Decimal, u64)> = Vec::new();

    for order in orders {
        overview.total_orders += 1;
        match order.status {
            OrderStatus::Pending => overview.by_status.pending += 1,
            OrderStatus::Confirmed => overview.by_status.confirmed += 1,
            OrderStatus::Cancelled => overview.by_status.cancelled += 1,
        }
        match order.payment_status {
            PaymentStatus::Pending => overview.by_payment_status.pending += 1,
            PaymentStatus::Partial => overview.by_payment_status.partial += 1,
            PaymentStatus::Paid => overview.by_payment_status.paid += 1,
            PaymentStatus::Refunded => overview.by_payment_status.refunded += 1,
        }

        overall.add(order);
        if order.is_confirmed() {
            confirmed.add(order);
        }
        if order.created_at >= since {
            recent.add(order);
        }

        for entry in &order.partner_profits {
            let idx = *partner_index.entry(entry.partner_id).or_insert_with(|| {
                partners.push((entry.partner_id, Decimal::ZERO, 0));
                partners.len() - 1
            });
            partners[idx].1 += entry.profit;
            partners[idx].2 += 1;
        }
    }

    partners.sort_by(|a, b| b.1.cmp(&a.1));
    let top_partners = partners
        .into_iter()
        .take(TOP_PARTNER_LIMIT)
        .map(|(partner_id, total_profit, order_count)| TopPartner {
            partner_id,
            partner_name: None,
            total_profit: round2(total_profit),
            order_count,
        })
        .collect();

    OrderStats {
        period_days,
        overview,
        financial: FinancialBreakdown {
            overall: overall.summary(),
            confirmed: confirmed.summary(),
            recent: recent.summary(),
        },
        top_partners,
        monthly_trends: monthly_trends(orders, now, tz),
    }
}

fn monthly_trends<Tz: TimeZone>(
    orders: &[OrderSnapshot],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<MonthlyTrend> {
    let local_now = now.with_timezone(tz);
    let current = local_now.year() * 12 + local_now.month0() as i32;
    let first = current - (TREND_MONTHS - 1);

    let mut buckets: Vec<Totals> = (0..TREND_MONTHS).map(|_| Totals::default()).collect();
    for order in orders.iter().filter(|o| o.is_confirmed()) {
        let local = order.created_at.with_timezone(tz);
        let key = local.year() * 12 + local.month0() as i32;
        if (first..=current).contains(&key) {
            buckets[(key - first) as usize].add(order);
        }
    }

    buckets
        .iter()
        .enumerate()
        .map(|(offset, totals)| {
            let key = first + offset as i32;
            MonthlyTrend {
                month: format!("{:04}-{:02}", key.div_euclid(12), key.rem_euclid(12) + 1),
                orders: totals.orders,
                revenue: round2(totals.revenue),
                gross_profit: round2(totals.gross_profit),
                net_profit: round2(totals.gross_profit - totals.partner_profit),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use rust_decimal_macros::dec;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn order(amount: i64, profit: i64, status: OrderStatus, at: DateTime<Utc>) -> OrderSnapshot {
        OrderSnapshot {
            amount: Decimal::from(amount),
            profit: Decimal::from(profit),
            partner_profits: Vec::new(),
            status,
            payment_status: PaymentStatus::Paid,
            created_at: at,
        }
    }

    fn paying(mut snapshot: OrderSnapshot, payouts: &[(Uuid, i64)]) -> OrderSnapshot {
        snapshot.partner_profits = payouts
            .iter()
            .map(|&(partner_id, profit)| PartnerProfitEntry {
                partner_id,
                profit: Decimal::from(profit),
                share_percentage: Decimal::ZERO,
            })
            .collect();
        snapshot
    }

    #[test]
    fn march_revenue_counts_confirmed_orders_only() {
        let p = Uuid::new_v4();
        let orders = vec![
            paying(
                order(1000, 200, OrderStatus::Confirmed, at(2024, 3, 5)),
                &[(p, 100)],
            ),
            paying(
                order(2000, 400, OrderStatus::Confirmed, at(2024, 3, 20)),
                &[(p, 100)],
            ),
            order(9000, 900, OrderStatus::Pending, at(2024, 3, 21)),
            order(5000, 500, OrderStatus::Confirmed, at(2023, 3, 10)),
        ];

        let report = monthly_revenue(&orders, 2024, &Utc);
        assert_eq!(report.year, 2024);
        assert_eq!(report.months.len(), 12);
        let march = &report.months[2];
        assert_eq!(march.month, "Mar");
        assert_eq!(march.orders, 2);
        assert_eq!(march.revenue, dec!(3000));
        assert_eq!(march.admin_profit, dec!(400));
        assert!(report
            .months
            .iter()
            .filter(|m| m.month != "Mar")
            .all(|m| m.orders == 0 && m.revenue.is_zero()));
    }

    #[test]
    fn months_are_bucketed_in_the_given_zone() {
        // 23:30 UTC on Jan 31 is already February two hours east
        let created = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
        let orders = vec![order(100, 10, OrderStatus::Confirmed, created)];

        let utc = monthly_revenue(&orders, 2024, &Utc);
        assert_eq!(utc.months[0].orders, 1);

        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let shifted = monthly_revenue(&orders, 2024, &east);
        assert_eq!(shifted.months[0].orders, 0);
        assert_eq!(shifted.months[1].orders, 1);
    }

    #[test]
    fn stats_split_overall_confirmed_and_recent() {
        let now = at(2024, 6, 15);
        let orders = vec![
            paying(
                order(5000, 1000, OrderStatus::Confirmed, at(2024, 6, 10)),
                &[(Uuid::new_v4(), 300)],
            ),
            order(2000, 500, OrderStatus::Pending, at(2024, 1, 10)),
            order(1000, 0, OrderStatus::Cancelled, at(2024, 6, 1)),
        ];

        let stats = order_stats(&orders, now, 30, &Utc);
        assert_eq!(stats.overview.total_orders, 3);
        assert_eq!(stats.overview.by_status.confirmed, 1);
        assert_eq!(stats.overview.by_status.pending, 1);
        assert_eq!(stats.overview.by_status.cancelled, 1);
        assert_eq!(stats.overview.by_payment_status.paid, 3);

        let overall = &stats.financial.overall;
        assert_eq!(overall.revenue, dec!(8000));
        assert_eq!(overall.gross_profit, dec!(1500));
        assert_eq!(overall.partner_profit, dec!(300));
        assert_eq!(overall.net_profit, dec!(1200));
        assert_eq!(overall.profit_margin, dec!(18.75));
        assert_eq!(overall.net_profit_margin, dec!(15));

        let confirmed = &stats.financial.confirmed;
        assert_eq!(confirmed.orders, 1);
        assert_eq!(confirmed.net_profit, dec!(700));
        assert_eq!(confirmed.profit_margin, dec!(20));

        let recent = &stats.financial.recent;
        assert_eq!(recent.orders, 2);
        assert_eq!(recent.revenue, dec!(6000));
    }

    #[test]
    fn margins_round_to_cents_once() {
        let when = at(2024, 6, 1);
        let orders = vec![order(3, 1, OrderStatus::Confirmed, when)];
        let overall = order_stats(&orders, when, 30, &Utc).financial.overall;
        assert_eq!(overall.profit_margin, dec!(33.33));
        assert_eq!(overall.profit_margin.to_string(), "33.33");
    }

    #[test]
    fn empty_input_has_zero_margins() {
        let stats = order_stats(&[], at(2024, 6, 15), 30, &Utc);
        assert!(stats.financial.overall.profit_margin.is_zero());
        assert!(stats.financial.overall.net_profit_margin.is_zero());
        assert!(stats.top_partners.is_empty());
        assert_eq!(stats.monthly_trends.len(), 12);
    }

    #[test]
    fn top_partners_rank_by_total_profit_and_keep_ties_stable() {
        let ids: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let when = at(2024, 5, 1);
        let sale = |status| order(1, 0, status, when);
        let orders = vec![
            paying(
                sale(OrderStatus::Confirmed),
                &[(ids[0], 1000), (ids[1], 3000)],
            ),
            paying(
                sale(OrderStatus::Pending),
                &[(ids[2], 1000), (ids[0], 1500)],
            ),
            paying(
                sale(OrderStatus::Cancelled),
                &[(ids[3], 500), (ids[4], 400)],
            ),
            paying(
                sale(OrderStatus::Confirmed),
                &[(ids[5], 1000), (ids[6], 100)],
            ),
        ];

        let top = order_stats(&orders, when, 30, &Utc).top_partners;
        let ranked: Vec<Uuid> = top.iter().map(|t| t.partner_id).collect();
        assert_eq!(ranked, vec![ids[1], ids[0], ids[2], ids[5], ids[3]]);
        assert_eq!(top[1].total_profit, dec!(2500));
        assert_eq!(top[1].order_count, 2);
        assert!(top.iter().all(|t| t.partner_name.is_none()));
    }

    #[test]
    fn trends_cover_twelve_months_ending_now() {
        let now = at(2024, 2, 15);
        let orders = vec![
            order(100, 20, OrderStatus::Confirmed, at(2024, 2, 1)),
            order(300, 60, OrderStatus::Confirmed, at(2023, 3, 9)),
            order(700, 70, OrderStatus::Confirmed, at(2023, 2, 9)),
            order(900, 90, OrderStatus::Pending, at(2024, 2, 2)),
        ];

        let trends = order_stats(&orders, now, 30, &Utc).monthly_trends;
        assert_eq!(trends.len(), 12);
        assert_eq!(trends.first().map(|t| t.month.as_str()), Some("2023-03"));
        assert_eq!(trends.last().map(|t| t.month.as_str()), Some("2024-02"));
        assert_eq!(trends[0].orders, 1);
        assert_eq!(trends[0].revenue, dec!(300));
        assert_eq!(trends[11].orders, 1);
        assert_eq!(trends[11].net_profit, dec!(20));
        assert_eq!(trends.iter().map(|t| t.orders).sum::<u64>(), 2);
    }
}
