use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MotoHub API",
        version = "0.1.0",
        description = r#"
# MotoHub Marketplace API

Storefront and back-office API for a motorcycle marketplace.

## Authentication

Admin endpoints under `/api/admin` require a user with the `admin` role. Send
the session token either as the `token` cookie set by `POST /api/auth/login`
or in the Authorization header:

```
Authorization: Bearer <your-jwt-token>
```

## Responses

Successful calls return `{"message", "data", "statusCode"}`. Failures return
`{"message", "statusCode", "errors"}` where `errors` lists field-level
validation messages.

## Pagination

List endpoints accept `page` (default 1) and `limit` query parameters and
return `{"items", "total", "page", "limit", "totalPages"}`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "storefront", description = "Public catalogue endpoints"),
        (name = "auth", description = "Registration, email verification and sessions"),
        (name = "bikes", description = "Bike inventory and partner shares"),
        (name = "partners", description = "Co-owners and their analytics"),
        (name = "purchase-orders", description = "Bike sales and partner payouts"),
        (name = "expenses", description = "Bike expenses and purchase price adjustments"),
        (name = "revenue", description = "Monthly revenue rollups"),
        (name = "bike-wash", description = "Bike wash locations"),
        (name = "public-info", description = "Public information entries"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        handlers::health::health_check,

        handlers::bikes::list_public_bikes,
        handlers::bikes::get_public_bike,
        handlers::bike_wash::list_public_locations,
        handlers::public_info::list_published,

        handlers::auth::register,
        handlers::auth::verify_email,
        handlers::auth::resend_verification,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,

        handlers::bikes::list_bikes,
        handlers::bikes::create_bike,
        handlers::bikes::get_bike,
        handlers::bikes::update_bike,
        handlers::bikes::delete_bike,

        handlers::partners::list_partners,
        handlers::partners::create_partner,
        handlers::partners::get_partner,
        handlers::partners::update_partner,
        handlers::partners::delete_partner,
        handlers::partners::partner_analytics,

        handlers::purchase_orders::list_purchase_orders,
        handlers::purchase_orders::create_purchase_order,
        handlers::purchase_orders::purchase_order_stats,
        handlers::purchase_orders::get_purchase_order,
        handlers::purchase_orders::update_purchase_order,
        handlers::purchase_orders::delete_purchase_order,

        handlers::expenses::list_expenses,
        handlers::expenses::create_expense,
        handlers::expenses::get_expense,
        handlers::expenses::update_expense,
        handlers::expenses::delete_expense,

        handlers::revenue::monthly_revenue,

        handlers::bike_wash::list_locations,
        handlers::bike_wash::create_location,
        handlers::bike_wash::update_location,
        handlers::bike_wash::delete_location,

        handlers::public_info::list_entries,
        handlers::public_info::create_entry,
        handlers::public_info::update_entry,
        handlers::public_info::delete_entry,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::entities::BikeStatus,
            crate::entities::ExpenseType,
            crate::entities::OrderStatus,
            crate::entities::PaymentStatus,
            crate::entities::PaymentMethod,
            crate::entities::UserRole,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer header and session cookie schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_admin_and_storefront_paths() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("MotoHub API"));
        assert!(json.contains("/api/bikes"));
        assert!(json.contains("/api/admin/purchase-orders/stats"));
        assert!(json.contains("/api/admin/partners/{id}/analytics"));
        assert!(json.contains("bearer_auth"));
    }
}
