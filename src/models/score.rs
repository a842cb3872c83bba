// src/models/score.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'scores' table: one row per completed quiz.
/// Rows are only ever inserted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub achieved_at: DateTime<Utc>,
}

/// Row to append to the attempt history.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub book_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub achieved_at: DateTime<Utc>,
}

/// Represents the 'leaderboard' table: a user's best score for one book.
/// Unique per (book_id, user_id).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub book_id: i64,
    pub user_id: i64,
    /// Username at the time the entry was last written.
    pub username: String,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

/// One row of a per-book leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookRanking {
    pub username: String,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

/// One row of the global leaderboard, joined with `bible_books`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GlobalRanking {
    pub username: String,
    pub score: i64,
    pub book_id: i64,
    pub book_name: String,
    pub updated_at: DateTime<Utc>,
}

/// A past attempt as shown on the "my scores" page.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptHistoryRow {
    pub book_id: i64,
    pub book_name: String,
    pub score: i64,
    pub total_questions: i64,
    pub achieved_at: DateTime<Utc>,
}

/// DTO for submitting a completed quiz.
#[derive(Debug, Deserialize)]
pub struct CompleteQuizRequest {
    pub book_id: i64,
    pub score: i64,
    pub total_questions: i64,
}

/// Outcome of recording an attempt.
///
/// The history append and the leaderboard write succeed or fail independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult {
    /// Mirrors `leaderboard_write_ok`.
    pub success: bool,
    /// Best score known for the pair after this call.
    pub final_score: i64,
    pub history_write_ok: bool,
    /// False only if reading or writing the leaderboard failed.
    pub leaderboard_write_ok: bool,
    /// True if the entry was created or replaced.
    pub leaderboard_updated: bool,
}

impl RecordResult {
    /// Exactly one of the two writes failed.
    pub fn is_partial(&self) -> bool {
        self.history_write_ok != self.leaderboard_write_ok
    }
}

/// Response for the results page.
#[derive(Debug, Serialize)]
pub struct BookResultResponse {
    pub book_id: i64,
    pub book_name: String,
    pub best_score: i64,
}

/// Query parameters for leaderboard listings.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}
