use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{
    hash_password, hash_verification_token, issue_verification_token, verify_password,
};
use crate::auth::{AuthError, AuthService};
use crate::db::DbPool;
use crate::entities::{user, UserRole};
use crate::errors::ServiceError;
use crate::mail::{verification_email, DynMailClient};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResendVerificationRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserProfile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserProfile,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accounts, email verification and login
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
    mailer: DynMailClient,
    public_base_url: String,
    verification_ttl_secs: u64,
}

impl UserService {
    pub fn new(
        db_pool: Arc<DbPool>,
        auth: Arc<AuthService>,
        mailer: DynMailClient,
        public_base_url: impl Into<String>,
        verification_ttl_secs: u64,
    ) -> Self {
        Self {
            db_pool,
            auth,
            mailer,
            public_base_url: public_base_url.into(),
            verification_ttl_secs,
        }
    }

    /// Creates an unverified account and mails the verification link.
    /// Delivery failures are logged; the account is kept either way.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, ServiceError> {
        let db = self.db_pool.as_ref();
        let email = normalize_email(&request.email);

        if self.find_by_email(&email).await?.is_some() {
            warn!("Registration attempted with an existing email");
            return Err(ServiceError::Conflict(format!(
                "An account with email {} already exists",
                email
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let token = issue_verification_token(self.verification_ttl_secs);
        let now = Utc::now();

        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(UserRole::User),
            is_verified: Set(false),
            verification_token_hash: Set(Some(token.token_hash)),
            verification_expires_at: Set(Some(token.expires_at)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        if let Err(err) = self.send_verification(&user, &token.raw_token).await {
            error!(user_id = %user.id, error = %err, "Failed to send verification email");
        }

        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Marks the account owning `raw_token` as verified.
    #[instrument(skip(self, raw_token))]
    pub async fn verify_email(&self, raw_token: &str) -> Result<UserProfile, ServiceError> {
        let db = self.db_pool.as_ref();
        let invalid =
            || ServiceError::BadRequest("Invalid or expired verification token".to_string());

        if raw_token.trim().is_empty() {
            return Err(invalid());
        }

        let token_hash = hash_verification_token(raw_token.trim());
        let user = user::Entity::find()
            .filter(user::Column::VerificationTokenHash.eq(token_hash))
            .one(db)
            .await?
            .ok_or_else(invalid)?;

        match user.verification_expires_at {
            Some(expires_at) if expires_at > Utc::now() => {}
            _ => {
                warn!(user_id = %user.id, "Expired verification token presented");
                return Err(invalid());
            }
        }

        let mut active: user::ActiveModel = user.into();
        active.is_verified = Set(true);
        active.verification_token_hash = Set(None);
        active.verification_expires_at = Set(None);
        active.updated_at = Set(Utc::now());
        let user = active.update(db).await?;

        info!(user_id = %user.id, "Email verified");
        Ok(user.into())
    }

    /// Issues a fresh link for an unverified account. Unknown and already
    /// verified addresses succeed silently.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn resend_verification(
        &self,
        request: ResendVerificationRequest,
    ) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let user = match self.find_by_email(&normalize_email(&request.email)).await? {
            Some(user) if !user.is_verified => user,
            _ => return Ok(()),
        };

        let token = issue_verification_token(self.verification_ttl_secs);
        let mut active: user::ActiveModel = user.into();
        active.verification_token_hash = Set(Some(token.token_hash));
        active.verification_expires_at = Set(Some(token.expires_at));
        active.updated_at = Set(Utc::now());
        let user = active.update(db).await?;

        self.send_verification(&user, &token.raw_token).await?;
        info!(user_id = %user.id, "Verification email re-sent");
        Ok(())
    }

    /// Checks credentials and issues a session token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ServiceError> {
        let user = self
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&user.password_hash, &request.password)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_verified {
            warn!(user_id = %user.id, "Login rejected: email not verified");
            return Err(AuthError::EmailNotVerified.into());
        }

        let token = self.auth.generate_token(user.id, &user.email, user.role)?;
        info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            token,
            user: user.into(),
        })
    }

    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(self.db_pool.as_ref())
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    /// Creates a verified admin with these credentials unless the email is
    /// already registered.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ServiceError> {
        let email = normalize_email(email);
        if let Some(existing) = self.find_by_email(&email).await? {
            return Ok(existing.into());
        }

        let now = Utc::now();
        let admin = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email),
            password_hash: Set(hash_password(password)?),
            role: Set(UserRole::Admin),
            is_verified: Set(true),
            verification_token_hash: Set(None),
            verification_expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(user_id = %admin.id, "Admin account created");
        Ok(admin.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db_pool.as_ref())
            .await?)
    }

    async fn send_verification(
        &self,
        user: &user::Model,
        raw_token: &str,
    ) -> Result<(), ServiceError> {
        let url = format!(
            "{}/api/auth/verify-email?token={}",
            self.public_base_url.trim_end_matches('/'),
            raw_token
        );
        self.mailer
            .send(verification_email(&user.email, &user.name, &url))
            .await?;
        Ok(())
    }
}
