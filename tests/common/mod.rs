#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use motohub_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::UserRole,
    handlers::AppServices,
    mail::{EmailMessage, MailClient, MailError},
    AppState,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@motohub.test";
pub const ADMIN_PASSWORD: &str = "admin-password-123";

const TEST_JWT_SECRET: &str =
    "integration-test-signing-key-0123456789-abcdefghijklmnopqrstuvwxyz-ABCDEFGHIJ";

/// Mail client that keeps every message for inspection.
#[derive(Default)]
pub struct CapturingMailClient {
    sent: Mutex<Vec<EmailMessage>>,
}

impl CapturingMailClient {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Raw token from the most recent verification link sent to `to`.
    pub fn verification_token_for(&self, to: &str) -> Option<String> {
        self.messages()
            .iter()
            .rev()
            .filter(|m| m.to == to)
            .find_map(|m| {
                let body = m.body_text.as_deref()?;
                let start = body.find("token=")? + "token=".len();
                let token: String = body[start..]
                    .chars()
                    .take_while(|c| !c.is_whitespace())
                    .collect();
                Some(token)
            })
    }
}

#[async_trait::async_trait]
impl MailClient for CapturingMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }

    fn sender(&self) -> &str {
        "MotoHub <no-reply@motohub.test>"
    }
}

/// Helper harness for spinning up the full router over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub mailer: Arc<CapturingMailClient>,
    admin_token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allow_any_origin = true;
        cfg.public_base_url = "http://motohub.test".to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg)));
        let mailer = Arc::new(CapturingMailClient::default());
        let services =
            AppServices::new(db_arc.clone(), &cfg, auth_service.clone(), mailer.clone());

        let admin = services
            .users
            .ensure_admin("Test Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("seed admin user");
        let admin_token = auth_service
            .generate_token(admin.id, &admin.email, UserRole::Admin)
            .expect("mint admin token");

        let state = AppState {
            db: db_arc,
            config: Arc::new(cfg),
            services,
            auth: auth_service,
        };
        let router = motohub_api::build_router(state.clone());

        Self {
            router,
            state,
            mailer,
            admin_token,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    /// Token for a verified non-admin account.
    pub fn user_token(&self) -> String {
        self.state
            .auth
            .generate_token(Uuid::new_v4(), "rider@motohub.test", UserRole::User)
            .expect("mint user token")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    /// Dispatches a prebuilt request through the router.
    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON envelope.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        response_json(response).await
    }

    /// Convenience helper for admin JSON requests.
    pub async fn admin(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call(method, uri, body, Some(self.admin_token())).await
    }

    pub async fn create_partner(&self, name: &str, email: &str) -> Uuid {
        let (status, body) = self
            .admin(
                Method::POST,
                "/api/admin/partners",
                Some(json!({ "name": name, "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create partner: {body}");
        id_of(&body["data"])
    }

    /// Creates a bike from `overrides` merged onto a valid default body.
    pub async fn create_bike(&self, overrides: Value) -> Value {
        let mut payload = json!({
            "name": "Street Triple",
            "brand": "Triumph",
            "model": "765 RS",
            "year": 2021,
            "mileage": 12000,
            "price": 10000.0,
            "purchasePrice": 8000.0
        });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }

        let (status, body) = self
            .admin(Method::POST, "/api/admin/bikes", Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create bike: {body}");
        body["data"].clone()
    }
}

pub async fn response_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("payload carries an id")
}

/// Reads a money field, which is serialized as a decimal string.
pub fn money(value: &Value) -> Decimal {
    match value {
        Value::String(text) => text.parse().expect("decimal string"),
        Value::Number(number) => number.to_string().parse().expect("decimal number"),
        other => panic!("expected a money value, got {other}"),
    }
}
