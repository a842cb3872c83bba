// src/handlers/profile.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::user::MeResponse,
    services::score_recorder::ScoreRecorder,
    store::AccountStore,
    utils::jwt::Claims,
};

/// Get current user's profile and number of completed quizzes.
pub async fn get_me(
    State(accounts): State<Arc<dyn AccountStore>>,
    State(recorder): State<ScoreRecorder>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let account = accounts
        .find_account(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let attempts_count = recorder.history(user_id).await?.len();

    Ok(Json(MeResponse {
        id: account.id,
        church_code: account.church_code,
        username: account.username,
        created_at: account.created_at,
        attempts_count,
    }))
}

/// Every quiz the current user completed, newest first.
pub async fn list_my_scores(
    State(recorder): State<ScoreRecorder>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let history = recorder.history(claims.user_id()?).await?;
    Ok(Json(history))
}
