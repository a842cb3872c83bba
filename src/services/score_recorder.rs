// src/services/score_recorder.rs

//! Records completed quizzes and keeps each user's best score per book.
//!
//! The attempt history and the leaderboard are written independently: a failed
//! history append never blocks the leaderboard update, and the reverse. Nothing
//! is retried or rolled back.
//!
//! A tied score counts as a new best, so repeating a best score refreshes
//! `updated_at` and moves the user up among equal scores.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    models::score::{
        AttemptHistoryRow, BookRanking, GlobalRanking, LeaderboardEntry, NewAttempt, RecordResult,
    },
    store::{ScoreStore, StoreError},
};

/// Source of "now" for attempt and leaderboard timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A completed quiz as submitted by the presentation layer.
#[derive(Debug, Clone)]
pub struct AttemptSubmission {
    pub user_id: i64,
    pub username: String,
    pub book_id: i64,
    pub score: i64,
    pub total_questions: i64,
}

#[derive(Debug)]
pub enum ScoreError {
    /// Score outside `[0, total_questions]` or `total_questions <= 0`.
    InvalidScore { score: i64, total_questions: i64 },

    /// The caller does not own the user id it submitted for.
    Forbidden,

    /// Neither write could be completed, or a read failed.
    BackingStoreUnavailable(StoreError),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::InvalidScore {
                score,
                total_questions,
            } => write!(
                f,
                "Invalid score {}: must be between 0 and {}",
                score, total_questions
            ),
            ScoreError::Forbidden => write!(f, "Cannot record a score for another user"),
            ScoreError::BackingStoreUnavailable(err) => write!(f, "Backing store unavailable: {}", err),
        }
    }
}

impl std::error::Error for ScoreError {}

impl From<StoreError> for ScoreError {
    fn from(err: StoreError) -> Self {
        ScoreError::BackingStoreUnavailable(err)
    }
}

#[derive(Clone)]
pub struct ScoreRecorder {
    store: Arc<dyn ScoreStore>,
    clock: Clock,
}

impl ScoreRecorder {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self::with_clock(store, Arc::new(Utc::now))
    }

    pub fn with_clock(store: Arc<dyn ScoreStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Appends the attempt and, if it ties or beats the stored best, replaces
    /// the leaderboard entry.
    ///
    /// `caller_id` is the user id established by the caller's session.
    pub async fn record_attempt(
        &self,
        caller_id: i64,
        submission: AttemptSubmission,
    ) -> Result<RecordResult, ScoreError> {
        let AttemptSubmission {
            user_id,
            username,
            book_id,
            score,
            total_questions,
        } = submission;

        if total_questions <= 0 || score < 0 || score > total_questions {
            return Err(ScoreError::InvalidScore {
                score,
                total_questions,
            });
        }

        if caller_id != user_id {
            tracing::warn!(caller_id, user_id, "Rejected score submission for another user");
            return Err(ScoreError::Forbidden);
        }

        let now = (self.clock)();

        let history = self
            .store
            .insert_attempt(NewAttempt {
                user_id,
                book_id,
                score,
                total_questions,
                achieved_at: now,
            })
            .await;

        let history_error = match history {
            Ok(_) => None,
            Err(e) if e.is_duplicate_key() => {
                tracing::warn!(user_id, book_id, "Duplicate attempt row ignored: {}", e);
                Some(e)
            }
            Err(e) => {
                tracing::error!(user_id, book_id, "Failed to append attempt: {}", e);
                Some(e)
            }
        };

        let leaderboard = self
            .reconcile_leaderboard(user_id, &username, book_id, score, now)
            .await;

        match (history_error, leaderboard) {
            (Some(history_err), Err(leaderboard_err)) => {
                tracing::error!(
                    user_id,
                    book_id,
                    "Both writes failed (history: {}, leaderboard: {})",
                    history_err,
                    leaderboard_err
                );
                Err(ScoreError::BackingStoreUnavailable(leaderboard_err))
            }
            (history_error, Ok((final_score, updated))) => Ok(RecordResult {
                success: true,
                final_score,
                history_write_ok: history_error.is_none(),
                leaderboard_write_ok: true,
                leaderboard_updated: updated,
            }),
            (None, Err(e)) => {
                tracing::error!(user_id, book_id, "Failed to update leaderboard: {}", e);
                // The best score is unknown; the submitted score is a lower bound.
                Ok(RecordResult {
                    success: false,
                    final_score: score,
                    history_write_ok: true,
                    leaderboard_write_ok: false,
                    leaderboard_updated: false,
                })
            }
        }
    }

    /// Returns the resulting best score and whether the entry was written.
    async fn reconcile_leaderboard(
        &self,
        user_id: i64,
        username: &str,
        book_id: i64,
        score: i64,
        now: DateTime<Utc>,
    ) -> Result<(i64, bool), StoreError> {
        let current_best = self
            .store
            .find_entry(user_id, book_id)
            .await?
            .map(|e| e.score)
            .unwrap_or(0);

        if score < current_best {
            tracing::debug!(user_id, book_id, score, current_best, "Leaderboard unchanged");
            return Ok((current_best, false));
        }

        let written = self
            .store
            .upsert_entry(&LeaderboardEntry {
                book_id,
                user_id,
                username: username.to_string(),
                score,
                updated_at: now,
            })
            .await?;

        if !written {
            // A concurrent submission stored a higher score after our read.
            let stored_best = self
                .store
                .find_entry(user_id, book_id)
                .await?
                .map_or(score, |e| e.score.max(score));
            tracing::info!(user_id, book_id, score, stored_best, "Leaderboard kept a higher score");
            return Ok((stored_best, false));
        }

        tracing::info!(user_id, book_id, score, "Leaderboard entry updated");
        Ok((score, true))
    }

    /// The stored best score, or 0 if the user never finished this book.
    pub async fn best_score(&self, user_id: i64, book_id: i64) -> Result<i64, ScoreError> {
        let entry = self.store.find_entry(user_id, book_id).await?;
        Ok(entry.map(|e| e.score).unwrap_or(0))
    }

    pub async fn top_scores(&self, book_id: i64, limit: i64) -> Result<Vec<BookRanking>, ScoreError> {
        Ok(self.store.top_scores(book_id, limit.max(0)).await?)
    }

    pub async fn global_top_scores(&self, limit: i64) -> Result<Vec<GlobalRanking>, ScoreError> {
        Ok(self.store.global_top_scores(limit.max(0)).await?)
    }

    pub async fn history(&self, user_id: i64) -> Result<Vec<AttemptHistoryRow>, ScoreError> {
        Ok(self.store.attempt_history(user_id).await?)
    }
}
