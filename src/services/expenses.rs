use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    ensure_partners_exist, find_bike, load_shares, page_index, shares_for_bike,
    validate_non_negative, Page,
};
use crate::db::DbPool;
use crate::entities::{bike, bike_service_record, expense, ExpenseType};
use crate::errors::ServiceError;
use crate::finance::{
    compute_share_amount, partner_has_share, partner_share_percentage, plan_adjustments, round2,
    AdjustmentState, PartnerShare, PriceAdjustment,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    pub bike_id: Uuid,
    pub partner_id: Option<Uuid>,
    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    #[validate(length(min = 1, max = 2000, message = "description is required"))]
    pub description: String,
    /// Defaults to now
    pub expense_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub adjust_bike_price: bool,
    #[serde(default)]
    pub adjust_partner_shares: bool,
}

/// An expense plus the referenced partner's portion when
/// `adjustPartnerShares` is set. The portion is reported only.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDetail {
    #[serde(flatten)]
    pub expense: expense::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_share_amount: Option<Decimal>,
}

impl ExpenseDetail {
    fn new(expense: expense::Model, shares: &[PartnerShare]) -> Self {
        let partner_share_amount = match expense.partner_id {
            Some(partner_id) if expense.adjust_partner_shares => Some(round2(
                compute_share_amount(expense.amount, partner_share_percentage(shares, partner_id)),
            )),
            _ => None,
        };
        Self {
            expense,
            partner_share_amount,
        }
    }
}

fn adjustment_state(expense: &expense::Model) -> AdjustmentState {
    AdjustmentState::of(expense.amount, expense.adjust_bike_price)
}

/// Service for bike expenses and their effect on purchase prices
#[derive(Clone)]
pub struct ExpenseService {
    db_pool: Arc<DbPool>,
}

impl ExpenseService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        bike_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<Page<ExpenseDetail>, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = expense::Entity::find();
        if let Some(bike_id) = bike_id {
            query = query.filter(expense::Column::BikeId.eq(bike_id));
        }
        let paginator = query
            .order_by_desc(expense::Column::ExpenseDate)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let expenses = paginator.fetch_page(page_index(page)).await?;

        let mut bike_ids: Vec<Uuid> = expenses.iter().map(|e| e.bike_id).collect();
        bike_ids.sort();
        bike_ids.dedup();
        let shares = load_shares(db, &bike_ids).await?;

        let items = expenses
            .into_iter()
            .map(|e| {
                let bike_shares = shares.get(&e.bike_id).map(Vec::as_slice).unwrap_or(&[]);
                ExpenseDetail::new(e, bike_shares)
            })
            .collect();
        Ok(Page { items, total })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, expense_id: Uuid) -> Result<ExpenseDetail, ServiceError> {
        let expense = self.find(expense_id).await?;
        let shares = shares_for_bike(self.db_pool.as_ref(), expense.bike_id).await?;
        Ok(ExpenseDetail::new(expense, &shares))
    }

    /// Records an expense, links it into the bike's service history and,
    /// when `adjustBikePrice` is set, adds the amount to the purchase price.
    #[instrument(skip(self, input), fields(bike_id = %input.bike_id))]
    pub async fn create(&self, input: ExpenseInput) -> Result<ExpenseDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let shares = self.check_references(&input).await?;

        let now = Utc::now();
        let expense = expense::ActiveModel {
            id: Set(Uuid::new_v4()),
            bike_id: Set(input.bike_id),
            partner_id: Set(input.partner_id),
            amount: Set(round2(input.amount)),
            expense_type: Set(input.expense_type),
            description: Set(input.description),
            expense_date: Set(input.expense_date.unwrap_or(now)),
            adjust_bike_price: Set(input.adjust_bike_price),
            adjust_partner_shares: Set(input.adjust_partner_shares),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        self.apply(&plan_adjustments(
            expense.bike_id,
            AdjustmentState::NotApplied,
            expense.bike_id,
            adjustment_state(&expense),
        ))
        .await?;
        self.link_service_record(expense.bike_id, expense.id).await?;

        info!(expense_id = %expense.id, amount = %expense.amount, "Expense created");
        Ok(ExpenseDetail::new(expense, &shares))
    }

    /// Replaces an expense, applying exactly the purchase-price difference
    /// between its old and new state. Moving to another bike reverses the
    /// old bike and applies to the new one.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        expense_id: Uuid,
        input: ExpenseInput,
    ) -> Result<ExpenseDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = self.find(expense_id).await?;
        let shares = self.check_references(&input).await?;

        let before_bike = existing.bike_id;
        let before = adjustment_state(&existing);

        let mut active: expense::ActiveModel = existing.into();
        active.bike_id = Set(input.bike_id);
        active.partner_id = Set(input.partner_id);
        active.amount = Set(round2(input.amount));
        active.expense_type = Set(input.expense_type);
        active.description = Set(input.description);
        if let Some(date) = input.expense_date {
            active.expense_date = Set(date);
        }
        active.adjust_bike_price = Set(input.adjust_bike_price);
        active.adjust_partner_shares = Set(input.adjust_partner_shares);
        active.updated_at = Set(Utc::now());
        let expense = active.update(db).await?;

        self.apply(&plan_adjustments(
            before_bike,
            before,
            expense.bike_id,
            adjustment_state(&expense),
        ))
        .await?;

        if before_bike != expense.bike_id {
            self.unlink_service_record(before_bike, expense.id).await?;
            self.link_service_record(expense.bike_id, expense.id).await?;
        }

        info!(expense_id = %expense_id, "Expense updated");
        Ok(ExpenseDetail::new(expense, &shares))
    }

    /// Deletes an expense, reversing any applied price adjustment.
    #[instrument(skip(self))]
    pub async fn delete(&self, expense_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let expense = self.find(expense_id).await?;

        self.apply(&plan_adjustments(
            expense.bike_id,
            adjustment_state(&expense),
            expense.bike_id,
            AdjustmentState::NotApplied,
        ))
        .await?;
        self.unlink_service_record(expense.bike_id, expense.id).await?;
        expense.delete(db).await?;

        info!(expense_id = %expense_id, "Expense deleted");
        Ok(())
    }

    async fn find(&self, expense_id: Uuid) -> Result<expense::Model, ServiceError> {
        expense::Entity::find_by_id(expense_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Expense", expense_id))
    }

    /// The bike must exist and a referenced partner must hold a share in
    /// it. Returns the bike's partner stakes.
    async fn check_references(
        &self,
        input: &ExpenseInput,
    ) -> Result<Vec<PartnerShare>, ServiceError> {
        let db = self.db_pool.as_ref();
        find_bike(db, input.bike_id).await?;
        let shares = shares_for_bike(db, input.bike_id).await?;

        if let Some(partner_id) = input.partner_id {
            ensure_partners_exist(db, &[partner_id]).await?;
            if !partner_has_share(&shares, partner_id) {
                warn!(
                    partner_id = %partner_id,
                    bike_id = %input.bike_id,
                    "Partner holds no share in bike"
                );
                return Err(ServiceError::ValidationError(format!(
                    "Partner {} has no share in bike {}",
                    partner_id, input.bike_id
                )));
            }
        }
        Ok(shares)
    }

    /// Moves each purchase price in the store in one statement, keeping
    /// the stored value at cents.
    async fn apply(&self, adjustments: &[PriceAdjustment]) -> Result<(), ServiceError> {
        for adjustment in adjustments {
            let adjusted = Expr::col(bike::Column::PurchasePrice).add(adjustment.delta);
            bike::Entity::update_many()
                .col_expr(
                    bike::Column::PurchasePrice,
                    Func::round_with_precision(adjusted, 2).into(),
                )
                .col_expr(bike::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(bike::Column::Id.eq(adjustment.bike_id))
                .exec(self.db_pool.as_ref())
                .await?;
            info!(
                bike_id = %adjustment.bike_id,
                delta = %adjustment.delta,
                "Adjusted bike purchase price"
            );
        }
        Ok(())
    }

    async fn link_service_record(
        &self,
        bike_id: Uuid,
        expense_id: Uuid,
    ) -> Result<(), ServiceError> {
        bike_service_record::Entity::insert(bike_service_record::ActiveModel {
            bike_id: Set(bike_id),
            expense_id: Set(expense_id),
            created_at: Set(Utc::now()),
        })
        .exec_without_returning(self.db_pool.as_ref())
        .await?;
        Ok(())
    }

    async fn unlink_service_record(
        &self,
        bike_id: Uuid,
        expense_id: Uuid,
    ) -> Result<(), ServiceError> {
        bike_service_record::Entity::delete_many()
            .filter(bike_service_record::Column::BikeId.eq(bike_id))
            .filter(bike_service_record::Column::ExpenseId.eq(expense_id))
            .exec(self.db_pool.as_ref())
            .await?;
        Ok(())
    }
}
