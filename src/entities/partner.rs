use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "partners")]
#[serde(rename_all = "camelCase")]
#[schema(as = Partner)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Cleared instead of deleting the row
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bike_partner::Entity")]
    BikePartner,
    #[sea_orm(has_many = "super::purchase_order_partner_profit::Entity")]
    PurchaseOrderPartnerProfit,
}

impl Related<super::bike_partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BikePartner.def()
    }
}

impl Related<super::purchase_order_partner_profit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderPartnerProfit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
