/*!
 * # Authentication and Authorization Module
 *
 * Session tokens are HS256 JWTs carried either in an HTTP-only cookie set at
 * login or in an `Authorization: Bearer` header. Admin routes are gated by
 * role through [`AuthRouterExt::with_role`].
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::UserRole;
use crate::errors::ErrorResponse;

pub mod password;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // user ID
    pub email: String, // user's email
    pub role: String,  // user's role
    pub jti: String,   // unique token ID
    pub iat: i64,      // issued at
    pub exp: i64,      // expiration
    pub nbf: i64,      // not valid before
    pub iss: String,   // issuer
    pub aud: String,   // audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.role.to_string() == role
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        token_expiration: Duration,
        cookie_name: String,
        cookie_secure: bool,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_expiration,
            cookie_name,
            cookie_secure,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
            cfg.cookie_name.clone(),
            cfg.cookie_secure,
        )
    }
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Issue a session token for a user
    pub fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.validate_nbf = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Resolve a token into the user it was issued for
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role,
            token_id: claims.jti,
        })
    }

    /// `Set-Cookie` value carrying a fresh session token
    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie_with(token, self.config.token_expiration.as_secs())
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_session_cookie(&self) -> String {
        self.cookie_with("", 0)
    }

    fn cookie_with(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
            self.config.cookie_name, value, max_age
        );
        if self.config.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Email address has not been verified")]
    EmailNotVerified,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        crate::errors::ServiceError::from(self).into_response()
    }
}

/// Pulls the authenticated user that [`auth_middleware`] stored on the request
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    if !user.has_role(&required_role) {
        debug!(user_id = %user.user_id, required_role = %required_role, "Role check failed");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates auth tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    message: "Authentication service not available".to_string(),
                    status_code: 500,
                    errors: None,
                }),
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers; a Bearer token wins
/// over the session cookie.
fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(token) = bearer_token(headers) {
        return auth_service.authenticate(token);
    }

    if let Some(token) = cookie_value(headers, &auth_service.config.cookie_name) {
        return auth_service.authenticate(token);
    }

    Err(AuthError::MissingAuth)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|v| !v.is_empty())
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "unit-test-signing-key-0123456789-abcdefghijklmnopqrstuvwxyz-ABCDEFG".into(),
            "motohub-api".into(),
            "motohub-admin".into(),
            Duration::from_secs(3600),
            "token".into(),
            false,
        ))
    }

    #[test]
    fn issued_token_round_trips() {
        let auth = service();
        let user_id = Uuid::new_v4();
        let token = auth
            .generate_token(user_id, "admin@motohub.test", UserRole::Admin)
            .unwrap();

        let user = auth.authenticate(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email, "admin@motohub.test");
        assert!(user.is_admin());
        assert!(user.has_role("admin"));
        assert!(!user.has_role("user"));
    }

    #[test]
    fn token_from_another_audience_is_rejected() {
        let issuer = service();
        let mut other = service();
        other.config.jwt_audience = "someone-else".into();

        let token = issuer
            .generate_token(Uuid::new_v4(), "a@b.test", UserRole::User)
            .unwrap();
        assert!(matches!(
            other.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = service();
        let token = auth
            .generate_token(Uuid::new_v4(), "a@b.test", UserRole::User)
            .unwrap();
        let tampered = format!("{}x", token);
        assert!(auth.validate_token(&tampered).is_err());
    }

    #[test]
    fn bearer_header_takes_precedence_over_cookie() {
        let auth = service();
        let bearer_user = Uuid::new_v4();
        let cookie_user = Uuid::new_v4();
        let bearer = auth
            .generate_token(bearer_user, "b@b.test", UserRole::Admin)
            .unwrap();
        let cookie = auth
            .generate_token(cookie_user, "c@c.test", UserRole::User)
            .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; token={}", cookie)).unwrap(),
        );
        let user = extract_auth_from_headers(&headers, &auth).unwrap();
        assert_eq!(user.user_id, cookie_user);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer)).unwrap(),
        );
        let user = extract_auth_from_headers(&headers, &auth).unwrap();
        assert_eq!(user.user_id, bearer_user);
    }

    #[test]
    fn missing_credentials_are_reported() {
        let auth = service();
        assert!(matches!(
            extract_auth_from_headers(&HeaderMap::new(), &auth),
            Err(AuthError::MissingAuth)
        ));
    }

    #[test]
    fn session_cookie_attributes() {
        let mut auth = service();
        let cookie = auth.session_cookie("abc");
        assert_eq!(
            cookie,
            "token=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=3600"
        );

        auth.config.cookie_secure = true;
        assert!(auth.clear_session_cookie().ends_with("Max-Age=0; Secure"));
    }
}
