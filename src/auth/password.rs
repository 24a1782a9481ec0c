use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::errors::ServiceError;

const VERIFICATION_TOKEN_BYTES: usize = 32;

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

pub fn verify_password(stored_hash: &str, candidate: &str) -> Result<bool, ServiceError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

/// An email verification token. Only `token_hash` is stored; `raw_token`
/// goes out in the verification link.
#[derive(Debug, Clone)]
pub struct VerificationToken {
    pub raw_token: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue_verification_token(ttl_secs: u64) -> VerificationToken {
    let mut bytes = [0u8; VERIFICATION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw_token = hex::encode(bytes);

    VerificationToken {
        token_hash: hash_verification_token(&raw_token),
        raw_token,
        expires_at: Utc::now() + Duration::seconds(ttl_secs as i64),
    }
}

pub fn hash_verification_token(raw_token: &str) -> String {
    hex::encode(Sha256::digest(raw_token.as_bytes()))
}
