use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::{ensure_partners_exist, find_bike, page_index, validate_non_negative, Page};
use crate::db::DbPool;
use crate::entities::{
    partner, purchase_order, purchase_order_partner_profit, OrderStatus, PaymentMethod,
    PaymentStatus,
};
use crate::errors::ServiceError;
use crate::finance::{
    net_profit, order_stats, round2, total_partner_profit, OrderSnapshot, OrderStats,
    PartnerProfitEntry,
};

pub const DEFAULT_STATS_PERIOD_DAYS: i64 = 30;

fn default_order_status() -> OrderStatus {
    OrderStatus::Pending
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::Pending
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Every editable field of a purchase order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderInput {
    pub bike_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "buyerName is required"))]
    pub buyer_name: String,
    #[validate(email(message = "buyerEmail must be a valid email address"))]
    pub buyer_email: String,
    pub buyer_phone: Option<String>,
    pub buyer_address: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,
    pub profit: Decimal,
    #[serde(default)]
    pub partners_profit: Vec<PartnerProfitEntry>,
    #[serde(default = "default_order_status")]
    pub status: OrderStatus,
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderStatusChange {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChange {
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "updateType", rename_all = "lowercase")]
pub enum OrderPartialUpdate {
    Status(OrderStatusChange),
    Payment(PaymentChange),
}

/// `PUT /purchase-orders/{id}` body, discriminated by `updateType`
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PurchaseOrderUpdate {
    Partial(OrderPartialUpdate),
    Full(PurchaseOrderInput),
}

impl Validate for PurchaseOrderUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            PurchaseOrderUpdate::Partial(_) => Ok(()),
            PurchaseOrderUpdate::Full(input) => input.validate(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub bike_id: Option<Uuid>,
}

/// An order with its partner payouts and derived profit figures
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    pub id: Uuid,
    pub bike_id: Uuid,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: Option<String>,
    pub buyer_address: Option<String>,
    pub amount: Decimal,
    pub profit: Decimal,
    pub partners_profit: Vec<PartnerProfitEntry>,
    pub total_partner_profit: Decimal,
    pub net_profit: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrderDetail {
    fn new(order: purchase_order::Model, rows: &[purchase_order_partner_profit::Model]) -> Self {
        let entries: Vec<PartnerProfitEntry> = rows.iter().map(PartnerProfitEntry::from).collect();
        let total = total_partner_profit(&entries);
        let net = net_profit(order.profit, &entries);

        Self {
            id: order.id,
            bike_id: order.bike_id,
            buyer_name: order.buyer_name,
            buyer_email: order.buyer_email,
            buyer_phone: order.buyer_phone,
            buyer_address: order.buyer_address,
            amount: round2(order.amount),
            profit: round2(order.profit),
            partners_profit: entries
                .into_iter()
                .map(|e| PartnerProfitEntry {
                    profit: round2(e.profit),
                    share_percentage: round2(e.share_percentage),
                    ..e
                })
                .collect(),
            total_partner_profit: round2(total),
            net_profit: round2(net),
            status: order.status,
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Service for bike sales
#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
}

impl PurchaseOrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(bike_id = %input.bike_id))]
    pub async fn create(
        &self,
        input: PurchaseOrderInput,
    ) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        self.check_references(&input).await?;

        let now = Utc::now();
        let order = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            bike_id: Set(input.bike_id),
            buyer_name: Set(input.buyer_name),
            buyer_email: Set(input.buyer_email),
            buyer_phone: Set(input.buyer_phone),
            buyer_address: Set(input.buyer_address),
            amount: Set(round2(input.amount)),
            profit: Set(round2(input.profit)),
            status: Set(input.status),
            payment_status: Set(input.payment_status),
            payment_method: Set(input.payment_method),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        let rows = self.replace_partner_profits(order.id, &input.partners_profit).await?;

        info!(order_id = %order.id, amount = %order.amount, "Purchase order created");
        Ok(PurchaseOrderDetail::new(order, &rows))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, order_id: Uuid) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let order = self.find(order_id).await?;
        let rows = order
            .find_related(purchase_order_partner_profit::Entity)
            .all(db)
            .await?;
        Ok(PurchaseOrderDetail::new(order, &rows))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: PurchaseOrderFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<PurchaseOrderDetail>, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(purchase_order::Column::Status.eq(status));
        }
        if let Some(payment_status) = filter.payment_status {
            condition = condition.add(purchase_order::Column::PaymentStatus.eq(payment_status));
        }
        if let Some(bike_id) = filter.bike_id {
            condition = condition.add(purchase_order::Column::BikeId.eq(bike_id));
        }

        let paginator = purchase_order::Entity::find()
            .filter(condition)
            .order_by_desc(purchase_order::Column::CreatedAt)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page_index(page)).await?;

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut rows = load_partner_profits(db, &ids).await?;
        let items = orders
            .into_iter()
            .map(|order| {
                let order_rows = rows.remove(&order.id).unwrap_or_default();
                PurchaseOrderDetail::new(order, &order_rows)
            })
            .collect();

        Ok(Page { items, total })
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        order_id: Uuid,
        update: PurchaseOrderUpdate,
    ) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = self.find(order_id).await?;
        let mut active: purchase_order::ActiveModel = existing.into();

        let replaced_profits = match update {
            PurchaseOrderUpdate::Partial(OrderPartialUpdate::Status(change)) => {
                active.status = Set(change.status);
                None
            }
            PurchaseOrderUpdate::Partial(OrderPartialUpdate::Payment(change)) => {
                active.payment_status = Set(change.payment_status);
                if let Some(method) = change.payment_method {
                    active.payment_method = Set(method);
                }
                None
            }
            PurchaseOrderUpdate::Full(input) => {
                self.check_references(&input).await?;
                active.bike_id = Set(input.bike_id);
                active.buyer_name = Set(input.buyer_name);
                active.buyer_email = Set(input.buyer_email);
                active.buyer_phone = Set(input.buyer_phone);
                active.buyer_address = Set(input.buyer_address);
                active.amount = Set(round2(input.amount));
                active.profit = Set(round2(input.profit));
                active.status = Set(input.status);
                active.payment_status = Set(input.payment_status);
                active.payment_method = Set(input.payment_method);
                active.notes = Set(input.notes);
                Some(input.partners_profit)
            }
        };

        active.updated_at = Set(Utc::now());
        let order = active.update(db).await?;

        let rows = match replaced_profits {
            Some(entries) => self.replace_partner_profits(order_id, &entries).await?,
            None => {
                order
                    .find_related(purchase_order_partner_profit::Entity)
                    .all(db)
                    .await?
            }
        };

        info!(order_id = %order_id, status = %order.status, "Purchase order updated");
        Ok(PurchaseOrderDetail::new(order, &rows))
    }

    /// Removes an order that has not been confirmed yet.
    #[instrument(skip(self))]
    pub async fn delete(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let order = self.find(order_id).await?;

        if order.status == OrderStatus::Confirmed {
            warn!(order_id = %order_id, "Refusing to delete a confirmed purchase order");
            return Err(ServiceError::InvalidOperation(
                "Confirmed purchase orders cannot be deleted".to_string(),
            ));
        }

        purchase_order_partner_profit::Entity::delete_many()
            .filter(purchase_order_partner_profit::Column::PurchaseOrderId.eq(order_id))
            .exec(db)
            .await?;
        order.delete(db).await?;

        info!(order_id = %order_id, "Purchase order deleted");
        Ok(())
    }

    /// Dashboard statistics over all orders, `recent` covering `period_days`.
    #[instrument(skip(self))]
    pub async fn stats(&self, period_days: i64) -> Result<OrderStats, ServiceError> {
        let db = self.db_pool.as_ref();
        let snapshots = load_snapshots(db, Condition::all()).await?;
        let mut stats = order_stats(&snapshots, Utc::now(), period_days, &Local);

        let partner_ids: Vec<Uuid> = stats.top_partners.iter().map(|p| p.partner_id).collect();
        if !partner_ids.is_empty() {
            let names: HashMap<Uuid, String> = partner::Entity::find()
                .filter(partner::Column::Id.is_in(partner_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect();
            for top in &mut stats.top_partners {
                top.partner_name = names.get(&top.partner_id).cloned();
            }
        }

        Ok(stats)
    }

    async fn find(&self, order_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        purchase_order::Entity::find_by_id(order_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", order_id))
    }

    async fn check_references(&self, input: &PurchaseOrderInput) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        find_bike(db, input.bike_id).await?;

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = input.partners_profit.iter().map(|e| e.partner_id).collect();
        if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
            warn!(partner_id = %dup, "Duplicate partner in partnersProfit");
            return Err(ServiceError::ValidationError(format!(
                "Partner {} is listed more than once in partnersProfit",
                dup
            )));
        }
        ensure_partners_exist(db, &ids).await
    }

    async fn replace_partner_profits(
        &self,
        order_id: Uuid,
        entries: &[PartnerProfitEntry],
    ) -> Result<Vec<purchase_order_partner_profit::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        purchase_order_partner_profit::Entity::delete_many()
            .filter(purchase_order_partner_profit::Column::PurchaseOrderId.eq(order_id))
            .exec(db)
            .await?;

        let rows: Vec<purchase_order_partner_profit::Model> = entries
            .iter()
            .map(|e| purchase_order_partner_profit::Model {
                id: Uuid::new_v4(),
                purchase_order_id: order_id,
                partner_id: e.partner_id,
                profit: round2(e.profit),
                share_percentage: e.share_percentage,
            })
            .collect();

        if !rows.is_empty() {
            let models = rows
                .iter()
                .cloned()
                .map(purchase_order_partner_profit::ActiveModel::from);
            purchase_order_partner_profit::Entity::insert_many(models)
                .exec_without_returning(db)
                .await?;
        }
        Ok(rows)
    }
}

/// Partner profit rows grouped by order id
pub(crate) async fn load_partner_profits(
    db: &DbPool,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<purchase_order_partner_profit::Model>>, ServiceError> {
    let mut grouped: HashMap<Uuid, Vec<purchase_order_partner_profit::Model>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = purchase_order_partner_profit::Entity::find()
        .filter(
            purchase_order_partner_profit::Column::PurchaseOrderId
                .is_in(order_ids.iter().copied()),
        )
        .all(db)
        .await?;
    for row in rows {
        grouped.entry(row.purchase_order_id).or_default().push(row);
    }
    Ok(grouped)
}

/// Rollup input for every order matching `condition`, oldest first
pub(crate) async fn load_snapshots(
    db: &DbPool,
    condition: Condition,
) -> Result<Vec<OrderSnapshot>, ServiceError> {
    let orders = purchase_order::Entity::find()
        .filter(condition)
        .order_by_asc(purchase_order::Column::CreatedAt)
        .all(db)
        .await?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let rows = load_partner_profits(db, &ids).await?;

    Ok(orders
        .iter()
        .map(|order| {
            let order_rows = rows.get(&order.id).map(Vec::as_slice).unwrap_or(&[]);
            OrderSnapshot::new(order, order_rows)
        })
        .collect())
}
