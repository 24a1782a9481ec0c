pub mod auth;
pub mod bike_wash;
pub mod bikes;
pub mod common;
pub mod expenses;
pub mod health;
pub mod partners;
pub mod public_info;
pub mod purchase_orders;
pub mod revenue;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::mail::DynMailClient;
use crate::services::{
    bike_wash::BikeWashService, bikes::BikeService, expenses::ExpenseService,
    partners::PartnerService, public_info::PublicInfoService,
    purchase_orders::PurchaseOrderService, revenue::RevenueService, users::UserService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub bikes: Arc<BikeService>,
    pub partners: Arc<PartnerService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub expenses: Arc<ExpenseService>,
    pub revenue: Arc<RevenueService>,
    pub bike_wash: Arc<BikeWashService>,
    pub public_info: Arc<PublicInfoService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        config: &AppConfig,
        auth_service: Arc<AuthService>,
        mailer: DynMailClient,
    ) -> Self {
        Self {
            bikes: Arc::new(BikeService::new(db_pool.clone())),
            partners: Arc::new(PartnerService::new(db_pool.clone())),
            purchase_orders: Arc::new(PurchaseOrderService::new(db_pool.clone())),
            expenses: Arc::new(ExpenseService::new(db_pool.clone())),
            revenue: Arc::new(RevenueService::new(db_pool.clone())),
            bike_wash: Arc::new(BikeWashService::new(db_pool.clone())),
            public_info: Arc::new(PublicInfoService::new(db_pool.clone())),
            users: Arc::new(UserService::new(
                db_pool,
                auth_service,
                mailer,
                config.public_base_url.clone(),
                config.verification_token_ttl_secs,
            )),
        }
    }
}
