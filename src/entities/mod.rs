pub mod bike;
pub mod bike_partner;
pub mod bike_service_record;
pub mod bike_wash_location;
pub mod expense;
pub mod partner;
pub mod public_info;
pub mod purchase_order;
pub mod purchase_order_partner_profit;
pub mod user;

pub use bike::BikeStatus;
pub use expense::ExpenseType;
pub use purchase_order::{OrderStatus, PaymentMethod, PaymentStatus};
pub use user::UserRole;
