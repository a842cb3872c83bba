// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        Account, LoginRequest, NewAccount, RegisterRequest, TokenResponse, derive_email,
    },
    store::AccountStore,
    utils::{
        hash::{hash_password, verify_password},
        json::AppJson,
        jwt::sign_jwt,
    },
};

fn token_response(account: &Account, config: &Config) -> Result<TokenResponse, AppError> {
    let token = sign_jwt(account, &config.jwt_secret, config.jwt_expiration)?;
    Ok(TokenResponse {
        token,
        token_type: "Bearer",
        username: account.username.clone(),
        church_code: account.church_code.clone(),
    })
}

/// Registers a new account under a church code.
///
/// The pair (church code, username) must be unique. On success the user is
/// logged in straight away: returns 201 Created with a bearer token.
pub async fn register(
    State(accounts): State<Arc<dyn AccountStore>>,
    State(config): State<Config>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = derive_email(&payload.username, &payload.church_code);
    let duplicate = || {
        AppError::Conflict(format!(
            "Username '{}' already exists for church code '{}'",
            payload.username, payload.church_code
        ))
    };

    if accounts
        .find_account_by_identity(&payload.church_code, &payload.username)
        .await?
        .is_some()
    {
        return Err(duplicate());
    }

    let password_hash = hash_password(&payload.password)?;

    let account = accounts
        .create_account(NewAccount {
            church_code: payload.church_code.clone(),
            username: payload.username.clone(),
            email,
            password_hash,
        })
        .await
        .map_err(|e| {
            if e.is_duplicate_key() {
                duplicate()
            } else {
                tracing::error!("Failed to register account: {}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!(user_id = account.id, church_code = %account.church_code, "Account registered");

    Ok((StatusCode::CREATED, Json(token_response(&account, &config)?)))
}

/// Authenticates with church code, username and password.
pub async fn login(
    State(accounts): State<Arc<dyn AccountStore>>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let account = accounts
        .find_account_by_identity(&payload.church_code, &payload.username)
        .await?
        .ok_or(AppError::AuthError(
            "Church code or username not found".to_string(),
        ))?;

    if !verify_password(&payload.password, &account.password_hash)? {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    Ok(Json(token_response(&account, &config)?))
}
