use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a bike in the inventory. `active` and `available` are
/// publicly listed; `inactive` is the soft-deleted state.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BikeStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "available")]
    Available,
}

impl BikeStatus {
    /// Statuses visible on the public storefront
    pub const PUBLIC: [BikeStatus; 2] = [BikeStatus::Active, BikeStatus::Available];

    pub fn is_public(self) -> bool {
        Self::PUBLIC.contains(&self)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "bikes")]
#[serde(rename_all = "camelCase")]
#[schema(as = Bike)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub mileage: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Asking price
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub price: Decimal,
    /// Acquisition cost, including applied expenses
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub purchase_price: Decimal,
    /// Owner's explicit share; derived from partner percentages when unset
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub my_share: Option<Decimal>,
    pub status: BikeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bike_partner::Entity")]
    BikePartner,
    #[sea_orm(has_many = "super::expense::Entity")]
    Expense,
    #[sea_orm(has_many = "super::purchase_order::Entity")]
    PurchaseOrder,
    #[sea_orm(has_many = "super::bike_service_record::Entity")]
    BikeServiceRecord,
}

impl Related<super::bike_partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BikePartner.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl Related<super::bike_service_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BikeServiceRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
