// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::config::{EMAIL_DOMAIN, MIN_PASSWORD_LENGTH};

/// Represents the 'accounts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,

    /// Congregation identifier. Together with `username` it forms the login identity.
    pub church_code: String,

    pub username: String,

    /// Derived from username and church code, see [`derive_email`].
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Row to insert when registering an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub church_code: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Builds the unique account email, e.g. `john-GRC01@quizapp.local`.
pub fn derive_email(username: &str, church_code: &str) -> String {
    format!("{}-{}@{}", username, church_code, EMAIL_DOMAIN)
}

/// `-` separates username and church code in the derived email, so neither
/// part may contain it.
fn validate_no_hyphen(value: &str) -> Result<(), validator::ValidationError> {
    if value.contains('-') {
        let mut err = validator::ValidationError::new("contains_hyphen");
        err.message = Some("Must not contain '-'.".into());
        return Err(err);
    }
    Ok(())
}

/// DTO for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(
            min = 1,
            max = 32,
            message = "Church code length must be between 1 and 32 characters."
        ),
        custom(function = validate_no_hyphen)
    )]
    pub church_code: String,
    #[validate(
        length(
            min = 1,
            max = 50,
            message = "Username length must be between 1 and 50 characters."
        ),
        custom(function = validate_no_hyphen)
    )]
    pub username: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = 128,
        message = "Password must be at least 6 characters."
    ))]
    pub password: String,
}

/// DTO for login. Only presence is checked; the password rule applies at registration.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 32))]
    pub church_code: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub username: String,
    pub church_code: String,
}

/// Profile of the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub church_code: String,
    pub username: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attempts_count: usize,
}
