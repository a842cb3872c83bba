// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    config::MAX_QUIZ_QUESTIONS,
    error::AppError,
    models::{
        question::{Book, CheckAnswerRequest, CheckAnswerResponse, PublicQuestion, QuizPaper},
        score::{BookResultResponse, CompleteQuizRequest},
    },
    services::score_recorder::{AttemptSubmission, ScoreRecorder},
    store::QuestionStore,
    utils::{json::AppJson, jwt::Claims},
};

async fn require_book(questions: &dyn QuestionStore, book_id: i64) -> Result<Book, AppError> {
    questions
        .find_book(book_id)
        .await?
        .ok_or(AppError::NotFound(format!("Book {} not found", book_id)))
}

/// Lists all books in canonical order.
pub async fn list_books(
    State(questions): State<Arc<dyn QuestionStore>>,
) -> Result<impl IntoResponse, AppError> {
    let books = questions.list_books().await.map_err(|e| {
        tracing::error!("Failed to fetch book list: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(books))
}

/// Generates a quiz for one book.
///
/// At most `MAX_QUIZ_QUESTIONS` questions, in random order, without answers.
pub async fn generate_paper(
    State(questions): State<Arc<dyn QuestionStore>>,
    Path(book_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let book = require_book(questions.as_ref(), book_id).await?;

    let sampled = questions
        .sample_questions(book_id, MAX_QUIZ_QUESTIONS)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions for book {}: {}", book_id, e);
            AppError::from(e)
        })?;

    if sampled.is_empty() {
        return Err(AppError::NotFound(format!(
            "No questions for book '{}'",
            book.name
        )));
    }

    let questions: Vec<PublicQuestion> = sampled.into_iter().map(PublicQuestion::from).collect();

    Ok(Json(QuizPaper {
        book_id: book.id,
        book_name: book.name,
        total_questions: questions.len(),
        questions,
    }))
}

/// Checks one answer against the stored key.
pub async fn check_answer(
    State(questions): State<Arc<dyn QuestionStore>>,
    AppJson(req): AppJson<CheckAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = questions
        .find_question(req.question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(CheckAnswerResponse {
        correct: req.answer == question.correct_answer,
        correct_answer: question.correct_answer,
    }))
}

/// Records a completed quiz for the logged-in user.
///
/// A single failed write still answers 200; the flags in the body say which
/// write went through.
pub async fn complete_quiz(
    State(questions): State<Arc<dyn QuestionStore>>,
    State(recorder): State<ScoreRecorder>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<CompleteQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    require_book(questions.as_ref(), req.book_id).await?;

    let result = recorder
        .record_attempt(
            user_id,
            AttemptSubmission {
                user_id,
                username: claims.username.clone(),
                book_id: req.book_id,
                score: req.score,
                total_questions: req.total_questions,
            },
        )
        .await?;

    if result.is_partial() {
        tracing::warn!(
            user_id,
            book_id = req.book_id,
            history_write_ok = result.history_write_ok,
            leaderboard_write_ok = result.leaderboard_write_ok,
            "Quiz recorded with a partial write failure"
        );
    }

    Ok(Json(result))
}

/// The caller's best score for a book, shown after a quiz.
pub async fn get_result(
    State(questions): State<Arc<dyn QuestionStore>>,
    State(recorder): State<ScoreRecorder>,
    Extension(claims): Extension<Claims>,
    Path(book_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let book = require_book(questions.as_ref(), book_id).await?;
    let best_score = recorder.best_score(claims.user_id()?, book_id).await?;

    Ok(Json(BookResultResponse {
        book_id: book.id,
        book_name: book.name,
        best_score,
    }))
}
