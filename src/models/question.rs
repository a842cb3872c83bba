// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'bible_books' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub name: String,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Book this question belongs to.
    pub book_id: i64,

    pub question_text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// The correct option. Never sent to the client with the question.
    pub correct_answer: String,
}

/// DTO for sending a question to the client (excludes the answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub options: [String; 4],
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            options: [q.option_a, q.option_b, q.option_c, q.option_d],
        }
    }
}

/// A generated quiz for one book.
#[derive(Debug, Serialize)]
pub struct QuizPaper {
    pub book_id: i64,
    pub book_name: String,
    pub total_questions: usize,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for checking a single answer.
#[derive(Debug, Deserialize)]
pub struct CheckAnswerRequest {
    pub question_id: i64,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct CheckAnswerResponse {
    pub correct: bool,
    pub correct_answer: String,
}
