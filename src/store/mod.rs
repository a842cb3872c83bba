// src/store/mod.rs

//! Backing-store abstraction.
//!
//! Handlers and the score recorder only see these traits. `postgres` is the
//! production backend; `memory` keeps everything in process and is used by
//! the test suites.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::models::{
    question::{Book, Question},
    score::{Attempt, AttemptHistoryRow, BookRanking, GlobalRanking, LeaderboardEntry, NewAttempt},
    user::{Account, NewAccount},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Classification of a backing-store failure.
///
/// Callers branch on this instead of inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The store could not be reached (connection, pool, I/O).
    Unavailable,
    /// The store refused the operation (row-level policy, privileges).
    PermissionDenied,
    /// A unique constraint was violated.
    DuplicateKey,
    Other,
}

#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        self.kind == StoreErrorKind::DuplicateKey
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Identity store: accounts keyed by (church code, username).
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `DuplicateKey` when the church code/username pair is taken.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;

    /// Looks up the account registered under `username` for `church_code`.
    async fn find_account_by_identity(
        &self,
        church_code: &str,
        username: &str,
    ) -> StoreResult<Option<Account>>;

    async fn find_account(&self, id: i64) -> StoreResult<Option<Account>>;
}

/// Books and their questions.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// All books ordered by id.
    async fn list_books(&self) -> StoreResult<Vec<Book>>;

    async fn find_book(&self, id: i64) -> StoreResult<Option<Book>>;

    /// Up to `limit` questions of the book, in presentation order.
    async fn sample_questions(&self, book_id: i64, limit: i64) -> StoreResult<Vec<Question>>;

    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>>;
}

/// Attempt history and leaderboard tables.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Appends one history row. Never updates existing rows.
    async fn insert_attempt(&self, attempt: NewAttempt) -> StoreResult<Attempt>;

    async fn find_entry(&self, user_id: i64, book_id: i64) -> StoreResult<Option<LeaderboardEntry>>;

    /// Inserts the entry for `(entry.book_id, entry.user_id)`, or replaces the
    /// stored one if its score is not higher than `entry.score`.
    ///
    /// Returns false when a higher stored score kept the row unchanged.
    async fn upsert_entry(&self, entry: &LeaderboardEntry) -> StoreResult<bool>;

    /// Ordered by score descending, then `updated_at` descending.
    async fn top_scores(&self, book_id: i64, limit: i64) -> StoreResult<Vec<BookRanking>>;

    /// Same ordering as [`ScoreStore::top_scores`], across all books.
    async fn global_top_scores(&self, limit: i64) -> StoreResult<Vec<GlobalRanking>>;

    /// The user's attempts, newest first.
    async fn attempt_history(&self, user_id: i64) -> StoreResult<Vec<AttemptHistoryRow>>;
}
