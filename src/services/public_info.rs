use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::public_info;
use crate::errors::ServiceError;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicInfoInput {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(length(min = 1, max = 100, message = "category is required"))]
    pub category: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Clone)]
pub struct PublicInfoService {
    db_pool: Arc<DbPool>,
}

impl PublicInfoService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Active entries by `sortOrder`, optionally narrowed to one category
    #[instrument(skip(self))]
    pub async fn list_published(
        &self,
        category: Option<String>,
    ) -> Result<Vec<public_info::Model>, ServiceError> {
        let mut query = public_info::Entity::find().filter(public_info::Column::IsActive.eq(true));
        if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
            query = query.filter(public_info::Column::Category.eq(category.trim()));
        }
        Ok(query
            .order_by_asc(public_info::Column::SortOrder)
            .order_by_asc(public_info::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<public_info::Model>, ServiceError> {
        Ok(public_info::Entity::find()
            .order_by_asc(public_info::Column::SortOrder)
            .order_by_asc(public_info::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: PublicInfoInput) -> Result<public_info::Model, ServiceError> {
        let now = Utc::now();
        let entry = public_info::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            content: Set(input.content),
            category: Set(input.category),
            is_active: Set(input.is_active),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(entry_id = %entry.id, "Public info entry created");
        Ok(entry)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        entry_id: Uuid,
        input: PublicInfoInput,
    ) -> Result<public_info::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = self.find(entry_id).await?;

        let mut active: public_info::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.content = Set(input.content);
        active.category = Set(input.category);
        active.is_active = Set(input.is_active);
        active.sort_order = Set(input.sort_order);
        active.updated_at = Set(Utc::now());
        let entry = active.update(db).await?;

        info!(entry_id = %entry_id, "Public info entry updated");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, entry_id: Uuid) -> Result<(), ServiceError> {
        let entry = self.find(entry_id).await?;
        entry.delete(self.db_pool.as_ref()).await?;
        info!(entry_id = %entry_id, "Public info entry deleted");
        Ok(())
    }

    async fn find(&self, entry_id: Uuid) -> Result<public_info::Model, ServiceError> {
        public_info::Entity::find_by_id(entry_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Public info entry", entry_id))
    }
}
