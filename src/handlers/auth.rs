use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common::{
    created_response, message_response, success_response, validate_input, ApiJson, ApiQuery,
};
use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::users::{
    LoginRequest, RegisterRequest, ResendVerificationRequest, UserProfile,
};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

/// Login payload; the token is also set as the session cookie
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

fn with_cookie(mut response: Response, cookie: &str) -> Result<Response, ServiceError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ServiceError::InternalError(format!("invalid cookie header: {}", e)))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, verification email sent", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid registration", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let user = state.services.users.register(payload).await?;
    Ok(created_response(
        "Registration successful. Please check your email to verify your account",
        user,
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify-email",
    params(VerifyEmailQuery),
    responses(
        (status = 200, description = "Email verified", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VerifyEmailQuery>,
) -> Result<Response, ServiceError> {
    let token = query
        .token
        .ok_or_else(|| ServiceError::BadRequest("Verification token is required".to_string()))?;
    let user = state.services.users.verify_email(&token).await?;
    Ok(success_response("Email verified successfully", user))
}

#[utoipa::path(
    post,
    path = "/api/auth/resend-verification",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Verification email sent if the account is pending"),
        (status = 400, description = "Invalid email", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn resend_verification(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResendVerificationRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    state.services.users.resend_verification(payload).await?;
    Ok(message_response(
        "If the account exists and is not verified, a new verification email has been sent",
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Email not verified", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let outcome = state.services.users.login(payload).await?;
    let cookie = state.auth.session_cookie(&outcome.token);

    let response = success_response(
        "Login successful",
        LoginResponse {
            token: outcome.token,
            user: outcome.user,
        },
    );
    with_cookie(response, &cookie)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>) -> Result<Response, ServiceError> {
    with_cookie(
        message_response("Logged out successfully"),
        &state.auth.clear_session_cookie(),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserProfile>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Response, ServiceError> {
    let profile = state.services.users.me(user.user_id).await?;
    Ok(success_response("User retrieved successfully", profile))
}

pub fn auth_routes() -> Router<AppState> {
    let session = Router::new().route("/me", get(me)).with_auth();

    Router::new()
        .route("/register", post(register))
        .route("/verify-email", get(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(session)
}
