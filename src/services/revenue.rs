use std::sync::Arc;

use chrono::{Datelike, Local};
use sea_orm::{ColumnTrait, Condition};
use tracing::instrument;

use super::purchase_orders::load_snapshots;
use crate::db::DbPool;
use crate::entities::{purchase_order, OrderStatus};
use crate::errors::ServiceError;
use crate::finance::{monthly_revenue, MonthlyRevenue};

/// Monthly revenue over confirmed orders, bucketed in the server's local time zone
#[derive(Clone)]
pub struct RevenueService {
    db_pool: Arc<DbPool>,
}

impl RevenueService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub fn current_year() -> i32 {
        Local::now().year()
    }

    #[instrument(skip(self))]
    pub async fn monthly(&self, year: Option<i32>) -> Result<MonthlyRevenue, ServiceError> {
        let year = year.unwrap_or_else(Self::current_year);
        let confirmed =
            Condition::all().add(purchase_order::Column::Status.eq(OrderStatus::Confirmed));
        let snapshots = load_snapshots(self.db_pool.as_ref(), confirmed).await?;
        Ok(monthly_revenue(&snapshots, year, &Local))
    }
}
