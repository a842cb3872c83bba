// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, error::ErrorKind};

use super::{AccountStore, QuestionStore, ScoreStore, StoreError, StoreErrorKind, StoreResult};
use crate::models::{
    question::{Book, Question},
    score::{Attempt, AttemptHistoryRow, BookRanking, GlobalRanking, LeaderboardEntry, NewAttempt},
    user::{Account, NewAccount},
};

/// Postgres SQLSTATE for `insufficient_privilege`, raised by row-level security.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// PostgreSQL backend.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps driver errors onto store error kinds.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreErrorKind::Unavailable,
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => StoreErrorKind::DuplicateKey,
                _ if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) => {
                    StoreErrorKind::PermissionDenied
                }
                _ => StoreErrorKind::Other,
            },
            _ => StoreErrorKind::Other,
        };
        StoreError::new(kind, err.to_string())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (church_code, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, church_code, username, email, password_hash, created_at
            "#,
        )
        .bind(&account.church_code)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_account_by_identity(
        &self,
        church_code: &str,
        username: &str,
    ) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, church_code, username, email, password_hash, created_at
            FROM accounts
            WHERE church_code = $1 AND username = $2
            "#,
        )
        .bind(church_code)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_account(&self, id: i64) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, church_code, username, email, password_hash, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT id, name FROM bible_books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    async fn find_book(&self, id: i64) -> StoreResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT id, name FROM bible_books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn sample_questions(&self, book_id: i64, limit: i64) -> StoreResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id,
                book_id,
                question_text,
                option_a,
                option_b,
                option_c,
                option_d,
                correct_answer
            FROM questions
            WHERE book_id = $1
            ORDER BY RANDOM()
            LIMIT $2
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id,
                book_id,
                question_text,
                option_a,
                option_b,
                option_c,
                option_d,
                correct_answer
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }
}

#[async_trait]
impl ScoreStore for PgStore {
    async fn insert_attempt(&self, attempt: NewAttempt) -> StoreResult<Attempt> {
        let row = sqlx::query_as::<_, Attempt>(
            r#"
            INSERT INTO scores (user_id, book_id, score, total_questions, achieved_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, book_id, score, total_questions, achieved_at
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.book_id)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(attempt.achieved_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_entry(&self, user_id: i64, book_id: i64) -> StoreResult<Option<LeaderboardEntry>> {
        let entry = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT book_id, user_id, username, score, updated_at
            FROM leaderboard
            WHERE user_id = $1 AND book_id = $2
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn upsert_entry(&self, entry: &LeaderboardEntry) -> StoreResult<bool> {
        // A row holding a higher score is left alone even if two submissions race.
        let result = sqlx::query(
            r#"
            INSERT INTO leaderboard (book_id, user_id, username, score, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (book_id, user_id) DO UPDATE SET
                username = EXCLUDED.username,
                score = EXCLUDED.score,
                updated_at = EXCLUDED.updated_at
            WHERE leaderboard.score <= EXCLUDED.score
            "#,
        )
        .bind(entry.book_id)
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(entry.score)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn top_scores(&self, book_id: i64, limit: i64) -> StoreResult<Vec<BookRanking>> {
        let rows = sqlx::query_as::<_, BookRanking>(
            r#"
            SELECT username, score, updated_at
            FROM leaderboard
            WHERE book_id = $1
            ORDER BY score DESC, updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn global_top_scores(&self, limit: i64) -> StoreResult<Vec<GlobalRanking>> {
        let rows = sqlx::query_as::<_, GlobalRanking>(
            r#"
            SELECT
                l.username,
                l.score,
                l.book_id,
                b.name AS book_name,
                l.updated_at
            FROM leaderboard l
            JOIN bible_books b ON l.book_id = b.id
            ORDER BY l.score DESC, l.updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn attempt_history(&self, user_id: i64) -> StoreResult<Vec<AttemptHistoryRow>> {
        let rows = sqlx::query_as::<_, AttemptHistoryRow>(
            r#"
            SELECT
                s.book_id,
                b.name AS book_name,
                s.score,
                s.total_questions,
                s.achieved_at
            FROM scores s
            JOIN bible_books b ON s.book_id = b.id
            WHERE s.user_id = $1
            ORDER BY s.achieved_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
