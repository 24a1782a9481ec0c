//! Domain services. Each service owns one aggregate, runs every existence
//! and membership check before it writes, and delegates the arithmetic to
//! [`crate::finance`].

pub mod bike_wash;
pub mod bikes;
pub mod expenses;
pub mod partners;
pub mod public_info;
pub mod purchase_orders;
pub mod revenue;
pub mod users;

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;
use validator::ValidationError;

use crate::db::DbPool;
use crate::entities::{bike, bike_partner, partner};
use crate::errors::ServiceError;
use crate::finance::PartnerShare;

/// One page of a list query plus the unpaged total
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Rejects amounts below zero
pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Zero-based page index for a one-based `page` query value
pub(crate) fn page_index(page: u64) -> u64 {
    page.saturating_sub(1)
}

pub(crate) async fn find_bike(db: &DbPool, bike_id: Uuid) -> Result<bike::Model, ServiceError> {
    bike::Entity::find_by_id(bike_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Bike", bike_id))
}

pub(crate) async fn find_partner(
    db: &DbPool,
    partner_id: Uuid,
) -> Result<partner::Model, ServiceError> {
    partner::Entity::find_by_id(partner_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Partner", partner_id))
}

/// Fails with the first id in `ids` that has no partner record.
pub(crate) async fn ensure_partners_exist(db: &DbPool, ids: &[Uuid]) -> Result<(), ServiceError> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: HashSet<Uuid> = partner::Entity::find()
        .filter(partner::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(ServiceError::not_found("Partner", missing)),
        None => Ok(()),
    }
}

/// Partner stakes for each of `bike_ids`; bikes without partners map to an
/// empty list.
pub(crate) async fn load_shares(
    db: &DbPool,
    bike_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<PartnerShare>>, ServiceError> {
    let mut shares: HashMap<Uuid, Vec<PartnerShare>> =
        bike_ids.iter().map(|id| (*id, Vec::new())).collect();
    if bike_ids.is_empty() {
        return Ok(shares);
    }

    let rows = bike_partner::Entity::find()
        .filter(bike_partner::Column::BikeId.is_in(bike_ids.iter().copied()))
        .all(db)
        .await?;

    for row in rows {
        shares.entry(row.bike_id).or_default().push(PartnerShare {
            partner_id: row.partner_id,
            percentage: row.percentage,
        });
    }
    Ok(shares)
}

pub(crate) async fn shares_for_bike(
    db: &DbPool,
    bike_id: Uuid,
) -> Result<Vec<PartnerShare>, ServiceError> {
    Ok(load_shares(db, &[bike_id])
        .await?
        .remove(&bike_id)
        .unwrap_or_default())
}
