// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{AccountStore, QuestionStore, ScoreStore, StoreError, StoreErrorKind, StoreResult};
use crate::models::{
    question::{Book, Question},
    score::{Attempt, AttemptHistoryRow, BookRanking, GlobalRanking, LeaderboardEntry, NewAttempt},
    user::{Account, NewAccount},
};

/// Store operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    InsertAttempt,
    FindEntry,
    UpsertEntry,
}

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    books: BTreeMap<i64, Book>,
    questions: Vec<Question>,
    attempts: Vec<Attempt>,
    leaderboard: HashMap<(i64, i64), LeaderboardEntry>,
    failures: HashMap<FailPoint, StoreErrorKind>,
}

/// Keeps every table in process memory.
///
/// Enforces the same unique keys as the SQL schema. `sample_questions`
/// returns questions in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_book(&self, name: &str) -> Book {
        let mut tables = self.tables();
        let id = tables.books.keys().next_back().copied().unwrap_or(0) + 1;
        let book = Book {
            id,
            name: name.to_string(),
        };
        tables.books.insert(id, book.clone());
        book
    }

    pub fn add_question(
        &self,
        book_id: i64,
        question_text: &str,
        options: [&str; 4],
        correct_answer: &str,
    ) -> Question {
        let mut tables = self.tables();
        let [a, b, c, d] = options.map(str::to_string);
        let question = Question {
            id: tables.questions.len() as i64 + 1,
            book_id,
            question_text: question_text.to_string(),
            option_a: a,
            option_b: b,
            option_c: c,
            option_d: d,
            correct_answer: correct_answer.to_string(),
        };
        tables.questions.push(question.clone());
        question
    }

    /// Every attempt row for the pair, oldest first.
    pub fn attempts_for(&self, user_id: i64, book_id: i64) -> Vec<Attempt> {
        self.tables()
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.book_id == book_id)
            .cloned()
            .collect()
    }

    /// Makes `point` fail with `kind` until [`MemoryStore::clear_failures`].
    pub fn fail(&self, point: FailPoint, kind: StoreErrorKind) {
        self.tables().failures.insert(point, kind);
    }

    pub fn clear_failures(&self) {
        self.tables().failures.clear();
    }

    fn check(tables: &Tables, point: FailPoint) -> StoreResult<()> {
        match tables.failures.get(&point) {
            Some(kind) => Err(StoreError::new(*kind, format!("injected failure at {:?}", point))),
            None => Ok(()),
        }
    }

    fn book_name(tables: &Tables, book_id: i64) -> Option<String> {
        tables.books.get(&book_id).map(|b| b.name.clone())
    }
}

fn by_rank(a: &LeaderboardEntry, b: &LeaderboardEntry) -> std::cmp::Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut tables = self.tables();
        let taken = tables.accounts.iter().any(|a| {
            a.email == account.email
                || (a.church_code == account.church_code && a.username == account.username)
        });
        if taken {
            return Err(StoreError::new(
                StoreErrorKind::DuplicateKey,
                "accounts_church_code_username_key",
            ));
        }

        let created = Account {
            id: tables.accounts.len() as i64 + 1,
            church_code: account.church_code,
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            created_at: Some(Utc::now()),
        };
        tables.accounts.push(created.clone());
        Ok(created)
    }

    async fn find_account_by_identity(
        &self,
        church_code: &str,
        username: &str,
    ) -> StoreResult<Option<Account>> {
        Ok(self
            .tables()
            .accounts
            .iter()
            .find(|a| a.church_code == church_code && a.username == username)
            .cloned())
    }

    async fn find_account(&self, id: i64) -> StoreResult<Option<Account>> {
        Ok(self.tables().accounts.iter().find(|a| a.id == id).cloned())
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn list_books(&self) -> StoreResult<Vec<Book>> {
        Ok(self.tables().books.values().cloned().collect())
    }

    async fn find_book(&self, id: i64) -> StoreResult<Option<Book>> {
        Ok(self.tables().books.get(&id).cloned())
    }

    async fn sample_questions(&self, book_id: i64, limit: i64) -> StoreResult<Vec<Question>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables()
            .questions
            .iter()
            .filter(|q| q.book_id == book_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>> {
        Ok(self.tables().questions.iter().find(|q| q.id == id).cloned())
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn insert_attempt(&self, attempt: NewAttempt) -> StoreResult<Attempt> {
        let mut tables = self.tables();
        Self::check(&tables, FailPoint::InsertAttempt)?;

        let collides = tables.attempts.iter().any(|a| {
            a.user_id == attempt.user_id
                && a.book_id == attempt.book_id
                && a.achieved_at == attempt.achieved_at
        });
        if collides {
            return Err(StoreError::new(
                StoreErrorKind::DuplicateKey,
                "scores_user_id_book_id_achieved_at_key",
            ));
        }

        let row = Attempt {
            id: tables.attempts.len() as i64 + 1,
            user_id: attempt.user_id,
            book_id: attempt.book_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            achieved_at: attempt.achieved_at,
        };
        tables.attempts.push(row.clone());
        Ok(row)
    }

    async fn find_entry(&self, user_id: i64, book_id: i64) -> StoreResult<Option<LeaderboardEntry>> {
        let tables = self.tables();
        Self::check(&tables, FailPoint::FindEntry)?;
        Ok(tables.leaderboard.get(&(book_id, user_id)).cloned())
    }

    async fn upsert_entry(&self, entry: &LeaderboardEntry) -> StoreResult<bool> {
        let mut tables = self.tables();
        Self::check(&tables, FailPoint::UpsertEntry)?;

        let key = (entry.book_id, entry.user_id);
        if tables
            .leaderboard
            .get(&key)
            .is_some_and(|stored| stored.score > entry.score)
        {
            return Ok(false);
        }
        tables.leaderboard.insert(key, entry.clone());
        Ok(true)
    }

    async fn top_scores(&self, book_id: i64, limit: i64) -> StoreResult<Vec<BookRanking>> {
        let tables = self.tables();
        let mut entries: Vec<&LeaderboardEntry> = tables
            .leaderboard
            .values()
            .filter(|e| e.book_id == book_id)
            .collect();
        entries.sort_by(|a, b| by_rank(a, b));

        Ok(entries
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|e| BookRanking {
                username: e.username.clone(),
                score: e.score,
                updated_at: e.updated_at,
            })
            .collect())
    }

    async fn global_top_scores(&self, limit: i64) -> StoreResult<Vec<GlobalRanking>> {
        let tables = self.tables();
        let mut entries: Vec<&LeaderboardEntry> = tables.leaderboard.values().collect();
        entries.sort_by(|a, b| by_rank(a, b));

        Ok(entries
            .into_iter()
            .filter_map(|e| {
                // Rows without a book are dropped, as the SQL join does.
                Some(GlobalRanking {
                    username: e.username.clone(),
                    score: e.score,
                    book_id: e.book_id,
                    book_name: Self::book_name(&tables, e.book_id)?,
                    updated_at: e.updated_at,
                })
            })
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn attempt_history(&self, user_id: i64) -> StoreResult<Vec<AttemptHistoryRow>> {
        let tables = self.tables();
        let mut rows: Vec<AttemptHistoryRow> = tables
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                Some(AttemptHistoryRow {
                    book_id: a.book_id,
                    book_name: Self::book_name(&tables, a.book_id)?,
                    score: a.score,
                    total_questions: a.total_questions,
                    achieved_at: a.achieved_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.achieved_at.cmp(&a.achieved_at));
        Ok(rows)
    }
}
