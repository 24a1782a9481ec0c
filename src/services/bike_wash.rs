use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_non_negative;
use crate::db::DbPool;
use crate::entities::bike_wash_location;
use crate::errors::ServiceError;
use crate::finance::round2;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeWashInput {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 300, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[validate(custom = "validate_non_negative")]
    pub price_from: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Clone)]
pub struct BikeWashService {
    db_pool: Arc<DbPool>,
}

impl BikeWashService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Active locations only, for the storefront
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<bike_wash_location::Model>, ServiceError> {
        Ok(bike_wash_location::Entity::find()
            .filter(bike_wash_location::Column::IsActive.eq(true))
            .order_by_asc(bike_wash_location::Column::City)
            .order_by_asc(bike_wash_location::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<bike_wash_location::Model>, ServiceError> {
        Ok(bike_wash_location::Entity::find()
            .order_by_asc(bike_wash_location::Column::City)
            .order_by_asc(bike_wash_location::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: BikeWashInput,
    ) -> Result<bike_wash_location::Model, ServiceError> {
        let now = Utc::now();
        let location = bike_wash_location::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            address: Set(input.address),
            city: Set(input.city),
            phone: Set(input.phone),
            services: Set(serde_json::json!(input.services)),
            price_from: Set(input.price_from.map(round2)),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(location_id = %location.id, "Bike wash location created");
        Ok(location)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        location_id: Uuid,
        input: BikeWashInput,
    ) -> Result<bike_wash_location::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = self.find(location_id).await?;

        let mut active: bike_wash_location::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.address = Set(input.address);
        active.city = Set(input.city);
        active.phone = Set(input.phone);
        active.services = Set(serde_json::json!(input.services));
        active.price_from = Set(input.price_from.map(round2));
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now());
        let location = active.update(db).await?;

        info!(location_id = %location_id, "Bike wash location updated");
        Ok(location)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, location_id: Uuid) -> Result<(), ServiceError> {
        let location = self.find(location_id).await?;
        location.delete(self.db_pool.as_ref()).await?;
        info!(location_id = %location_id, "Bike wash location deleted");
        Ok(())
    }

    async fn find(&self, location_id: Uuid) -> Result<bike_wash_location::Model, ServiceError> {
        bike_wash_location::Entity::find_by_id(location_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Bike wash location", location_id))
    }
}
