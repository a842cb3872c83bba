// src/handlers/leaderboard.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    config::{BOOK_LEADERBOARD_LIMIT, GLOBAL_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT},
    error::AppError,
    models::score::LeaderboardParams,
    services::score_recorder::ScoreRecorder,
    store::QuestionStore,
};

fn effective_limit(params: &LeaderboardParams, default: i64) -> i64 {
    params.limit.unwrap_or(default).clamp(1, MAX_LEADERBOARD_LIMIT)
}

/// Top scores for one book. Ties go to the most recent.
pub async fn book_leaderboard(
    State(questions): State<Arc<dyn QuestionStore>>,
    State(recorder): State<ScoreRecorder>,
    Path(book_id): Path<i64>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let book = questions
        .find_book(book_id)
        .await?
        .ok_or(AppError::NotFound(format!("Book {} not found", book_id)))?;

    let rows = recorder
        .top_scores(book_id, effective_limit(&params, BOOK_LEADERBOARD_LIMIT))
        .await?;

    Ok(Json(serde_json::json!({
        "book_id": book.id,
        "book_name": book.name,
        "leaderboard": rows,
    })))
}

/// Top scores across all books.
pub async fn global_leaderboard(
    State(recorder): State<ScoreRecorder>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let rows = recorder
        .global_top_scores(effective_limit(&params, GLOBAL_LEADERBOARD_LIMIT))
        .await?;

    Ok(Json(rows))
}
