use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{find_partner, load_shares, page_index, Page};
use crate::db::DbPool;
use crate::entities::{bike, bike_partner, partner};
use crate::errors::ServiceError;
use crate::finance::{
    compute_partner_analytics, BikeAnalytics, BikeHolding, PartnerAnalyticsSummary,
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInput {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 50, message = "phone is too long"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// `GET /partners/{id}/analytics` payload
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAnalyticsReport {
    pub partner: partner::Model,
    pub summary: PartnerAnalyticsSummary,
    pub bike_analytics: Vec<BikeAnalytics>,
}

/// Service for business partners
#[derive(Clone)]
pub struct PartnerService {
    db_pool: Arc<DbPool>,
}

impl PartnerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: PartnerFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<partner::Model>, ServiceError> {
        let mut condition = Condition::all();
        if let Some(is_active) = filter.is_active {
            condition = condition.add(partner::Column::IsActive.eq(is_active));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let term = search.trim();
            condition = condition.add(
                Condition::any()
                    .add(partner::Column::Name.contains(term))
                    .add(partner::Column::Email.contains(term)),
            );
        }

        let paginator = partner::Entity::find()
            .filter(condition)
            .order_by_asc(partner::Column::Name)
            .paginate(self.db_pool.as_ref(), limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_index(page)).await?;
        Ok(Page { items, total })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, partner_id: Uuid) -> Result<partner::Model, ServiceError> {
        find_partner(self.db_pool.as_ref(), partner_id).await
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: PartnerInput) -> Result<partner::Model, ServiceError> {
        let email = input.email.trim().to_lowercase();
        self.ensure_email_free(&email, None).await?;

        let now = Utc::now();
        let partner = partner::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(email),
            phone: Set(input.phone),
            address: Set(input.address),
            notes: Set(input.notes),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(partner_id = %partner.id, "Partner created");
        Ok(partner)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        partner_id: Uuid,
        input: PartnerInput,
    ) -> Result<partner::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = find_partner(db, partner_id).await?;

        let email = input.email.trim().to_lowercase();
        self.ensure_email_free(&email, Some(partner_id)).await?;

        let mut active: partner::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.email = Set(email);
        active.phone = Set(input.phone);
        active.address = Set(input.address);
        active.notes = Set(input.notes);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now());
        let partner = active.update(db).await?;

        info!(partner_id = %partner_id, "Partner updated");
        Ok(partner)
    }

    /// Soft delete via `isActive = false`
    #[instrument(skip(self))]
    pub async fn deactivate(&self, partner_id: Uuid) -> Result<partner::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = find_partner(db, partner_id).await?;

        let mut active: partner::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        let partner = active.update(db).await?;

        info!(partner_id = %partner_id, "Partner deactivated");
        Ok(partner)
    }

    /// Share, earnings and profit across every bike the partner holds a stake in.
    #[instrument(skip(self))]
    pub async fn analytics(
        &self,
        partner_id: Uuid,
    ) -> Result<PartnerAnalyticsReport, ServiceError> {
        let db = self.db_pool.as_ref();
        let partner = find_partner(db, partner_id).await?;

        let bike_ids: Vec<Uuid> = bike_partner::Entity::find()
            .filter(bike_partner::Column::PartnerId.eq(partner_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.bike_id)
            .collect();

        let bikes = if bike_ids.is_empty() {
            Vec::new()
        } else {
            bike::Entity::find()
                .filter(bike::Column::Id.is_in(bike_ids.iter().copied()))
                .order_by_asc(bike::Column::CreatedAt)
                .all(db)
                .await?
        };

        let mut shares = load_shares(db, &bike_ids).await?;
        let holdings: Vec<BikeHolding> = bikes
            .into_iter()
            .map(|bike| {
                let shares = shares.remove(&bike.id).unwrap_or_default();
                BikeHolding { bike, shares }
            })
            .collect();

        let analytics = compute_partner_analytics(&holdings, partner_id);
        Ok(PartnerAnalyticsReport {
            partner,
            summary: analytics.summary,
            bike_analytics: analytics.bike_analytics,
        })
    }

    async fn ensure_email_free(
        &self,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = partner::Entity::find().filter(partner::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(partner::Column::Id.ne(id));
        }

        if query.one(self.db_pool.as_ref()).await?.is_some() {
            warn!(email = %email, "Partner email already in use");
            return Err(ServiceError::Conflict(format!(
                "Partner with email {} already exists",
                email
            )));
        }
        Ok(())
    }
}
