use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::{
    ensure_partners_exist, find_bike, load_shares, page_index, shares_for_bike,
    validate_non_negative, Page,
};
use crate::db::DbPool;
use crate::entities::{bike, bike_partner, bike_service_record, BikeStatus};
use crate::errors::ServiceError;
use crate::finance::{compute_my_share, round2, validate_partner_shares, PartnerShare};

fn default_bike_status() -> BikeStatus {
    BikeStatus::Available
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikePartnerInput {
    pub partner_id: Uuid,
    pub percentage: Decimal,
}

impl From<BikePartnerInput> for PartnerShare {
    fn from(input: BikePartnerInput) -> Self {
        PartnerShare {
            partner_id: input.partner_id,
            percentage: input.percentage,
        }
    }
}

/// Every editable field of a bike
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeInput {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, max = 100, message = "model is required"))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100, message = "year must be between 1900 and 2100"))]
    pub year: i32,
    #[validate(range(min = 0, message = "mileage cannot be negative"))]
    pub mileage: i32,
    pub description: Option<String>,
    #[validate(url(message = "imageUrl must be a valid URL"))]
    pub image_url: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub purchase_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub my_share: Option<Decimal>,
    #[serde(default)]
    pub partners: Vec<BikePartnerInput>,
    #[serde(default = "default_bike_status")]
    pub status: BikeStatus,
}

impl BikeInput {
    fn shares(&self) -> Vec<PartnerShare> {
        self.partners.iter().copied().map(PartnerShare::from).collect()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BikeStatusChange {
    pub status: BikeStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "updateType", rename_all = "lowercase")]
pub enum BikePartialUpdate {
    Status(BikeStatusChange),
}

/// `PUT /bikes/{id}` body: `{"updateType": "status", ...}` or a full bike.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum BikeUpdate {
    Partial(BikePartialUpdate),
    Full(BikeInput),
}

impl Validate for BikeUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            BikeUpdate::Partial(_) => Ok(()),
            BikeUpdate::Full(input) => input.validate(),
        }
    }
}

/// Storefront filters
#[derive(Debug, Clone, Default)]
pub struct PublicBikeFilter {
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
}

/// Admin list filters
#[derive(Debug, Clone, Default)]
pub struct BikeFilter {
    pub status: Option<BikeStatus>,
    pub brand: Option<String>,
    pub search: Option<String>,
}

/// A bike as shown on the storefront
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicBike {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub mileage: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub status: BikeStatus,
}

impl From<bike::Model> for PublicBike {
    fn from(bike: bike::Model) -> Self {
        Self {
            id: bike.id,
            name: bike.name,
            brand: bike.brand,
            model: bike.model,
            year: bike.year,
            mileage: bike.mileage,
            description: bike.description,
            image_url: bike.image_url,
            price: round2(bike.price),
            status: bike.status,
        }
    }
}

/// A bike with its partner stakes and service history
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeDetail {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub mileage: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub purchase_price: Decimal,
    /// Stored value, or the price left after partner percentages
    pub my_share: Decimal,
    pub partners: Vec<BikePartnerInput>,
    pub status: BikeStatus,
    /// Expense ids
    pub service_history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BikeDetail {
    fn new(bike: bike::Model, shares: Vec<PartnerShare>, service_history: Vec<Uuid>) -> Self {
        let my_share = bike
            .my_share
            .unwrap_or_else(|| compute_my_share(bike.price, &shares));

        Self {
            id: bike.id,
            name: bike.name,
            brand: bike.brand,
            model: bike.model,
            year: bike.year,
            mileage: bike.mileage,
            description: bike.description,
            image_url: bike.image_url,
            price: round2(bike.price),
            purchase_price: round2(bike.purchase_price),
            my_share: round2(my_share),
            partners: shares
                .into_iter()
                .map(|s| BikePartnerInput {
                    partner_id: s.partner_id,
                    percentage: round2(s.percentage),
                })
                .collect(),
            status: bike.status,
            service_history,
            created_at: bike.created_at,
            updated_at: bike.updated_at,
        }
    }
}

/// Service for the bike inventory
#[derive(Clone)]
pub struct BikeService {
    db_pool: Arc<DbPool>,
}

impl BikeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Bikes currently for sale
    #[instrument(skip(self))]
    pub async fn list_public(
        &self,
        filter: PublicBikeFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<PublicBike>, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut condition =
            Condition::all().add(bike::Column::Status.is_in(BikeStatus::PUBLIC.iter().copied()));
        if let Some(brand) = filter.brand.filter(|b| !b.trim().is_empty()) {
            condition = condition.add(bike::Column::Brand.eq(brand.trim()));
        }
        if let Some(min) = filter.min_price {
            condition = condition.add(bike::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            condition = condition.add(bike::Column::Price.lte(max));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            condition = condition.add(search_condition(search.trim()));
        }

        let paginator = bike::Entity::find()
            .filter(condition)
            .order_by_desc(bike::Column::CreatedAt)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_index(page)).await?;

        Ok(Page { items, total }.map(PublicBike::from))
    }

    #[instrument(skip(self))]
    pub async fn get_public(&self, bike_id: Uuid) -> Result<PublicBike, ServiceError> {
        let bike = find_bike(self.db_pool.as_ref(), bike_id).await?;
        if !bike.status.is_public() {
            return Err(ServiceError::not_found("Bike", bike_id));
        }
        Ok(bike.into())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: BikeFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<BikeDetail>, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(bike::Column::Status.eq(status));
        }
        if let Some(brand) = filter.brand.filter(|b| !b.trim().is_empty()) {
            condition = condition.add(bike::Column::Brand.eq(brand.trim()));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            condition = condition.add(search_condition(search.trim()));
        }

        let paginator = bike::Entity::find()
            .filter(condition)
            .order_by_desc(bike::Column::CreatedAt)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let bikes = paginator.fetch_page(page_index(page)).await?;

        let ids: Vec<Uuid> = bikes.iter().map(|b| b.id).collect();
        let mut shares = load_shares(db, &ids).await?;
        let mut history = self.load_service_history(&ids).await?;

        let items = bikes
            .into_iter()
            .map(|b| {
                let id = b.id;
                BikeDetail::new(
                    b,
                    shares.remove(&id).unwrap_or_default(),
                    history.remove(&id).unwrap_or_default(),
                )
            })
            .collect();

        Ok(Page { items, total })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, bike_id: Uuid) -> Result<BikeDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let bike = find_bike(db, bike_id).await?;
        self.detail(bike).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: BikeInput) -> Result<BikeDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let shares = input.shares();
        self.check_shares(&shares).await?;

        let now = Utc::now();
        let bike = bike::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            brand: Set(input.brand),
            model: Set(input.model),
            year: Set(input.year),
            mileage: Set(input.mileage),
            description: Set(input.description),
            image_url: Set(input.image_url),
            price: Set(round2(input.price)),
            purchase_price: Set(round2(input.purchase_price)),
            my_share: Set(input.my_share.map(round2)),
            status: Set(input.status),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        self.replace_shares(bike.id, &shares).await?;

        info!(bike_id = %bike.id, partners = shares.len(), "Bike created");
        Ok(BikeDetail::new(bike, shares, Vec::new()))
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        bike_id: Uuid,
        update: BikeUpdate,
    ) -> Result<BikeDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = find_bike(db, bike_id).await?;

        match update {
            BikeUpdate::Partial(BikePartialUpdate::Status(change)) => {
                let mut active: bike::ActiveModel = existing.into();
                active.status = Set(change.status);
                active.updated_at = Set(Utc::now());
                let bike = active.update(db).await?;
                info!(bike_id = %bike_id, status = %change.status, "Bike status changed");
                self.detail(bike).await
            }
            BikeUpdate::Full(input) => {
                let shares = input.shares();
                self.check_shares(&shares).await?;

                let mut active: bike::ActiveModel = existing.into();
                active.name = Set(input.name);
                active.brand = Set(input.brand);
                active.model = Set(input.model);
                active.year = Set(input.year);
                active.mileage = Set(input.mileage);
                active.description = Set(input.description);
                active.image_url = Set(input.image_url);
                active.price = Set(round2(input.price));
                active.purchase_price = Set(round2(input.purchase_price));
                active.my_share = Set(input.my_share.map(round2));
                active.status = Set(input.status);
                active.updated_at = Set(Utc::now());
                let bike = active.update(db).await?;

                self.replace_shares(bike_id, &shares).await?;
                info!(bike_id = %bike_id, "Bike updated");
                self.detail(bike).await
            }
        }
    }

    /// Soft delete: the bike is kept with status `inactive`.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, bike_id: Uuid) -> Result<BikeDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = find_bike(db, bike_id).await?;

        let mut active: bike::ActiveModel = existing.into();
        active.status = Set(BikeStatus::Inactive);
        active.updated_at = Set(Utc::now());
        let bike = active.update(db).await?;

        info!(bike_id = %bike_id, "Bike deactivated");
        self.detail(bike).await
    }

    async fn detail(&self, bike: bike::Model) -> Result<BikeDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let shares = shares_for_bike(db, bike.id).await?;
        let history = self
            .load_service_history(&[bike.id])
            .await?
            .remove(&bike.id)
            .unwrap_or_default();
        Ok(BikeDetail::new(bike, shares, history))
    }

    async fn check_shares(&self, shares: &[PartnerShare]) -> Result<(), ServiceError> {
        if let Err(err) = validate_partner_shares(shares) {
            warn!(error = %err, "Rejected partner shares");
            return Err(err.into());
        }
        let ids: Vec<Uuid> = shares.iter().map(|s| s.partner_id).collect();
        ensure_partners_exist(self.db_pool.as_ref(), &ids).await
    }

    async fn replace_shares(
        &self,
        bike_id: Uuid,
        shares: &[PartnerShare],
    ) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        bike_partner::Entity::delete_many()
            .filter(bike_partner::Column::BikeId.eq(bike_id))
            .exec(db)
            .await?;

        if shares.is_empty() {
            return Ok(());
        }

        let rows = shares.iter().map(|s| bike_partner::ActiveModel {
            id: Set(Uuid::new_v4()),
            bike_id: Set(bike_id),
            partner_id: Set(s.partner_id),
            percentage: Set(s.percentage),
        });
        bike_partner::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    async fn load_service_history(
        &self,
        bike_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Uuid>>, ServiceError> {
        let mut history: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        if bike_ids.is_empty() {
            return Ok(history);
        }

        let records = bike_service_record::Entity::find()
            .filter(bike_service_record::Column::BikeId.is_in(bike_ids.iter().copied()))
            .order_by_asc(bike_service_record::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        for record in records {
            history.entry(record.bike_id).or_default().push(record.expense_id);
        }
        Ok(history)
    }
}

fn search_condition(term: &str) -> Condition {
    Condition::any()
        .add(bike::Column::Name.contains(term))
        .add(bike::Column::Brand.contains(term))
        .add(bike::Column::Model.contains(term))
}
