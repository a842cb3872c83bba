// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Upper bound on the number of questions served for one quiz.
pub const MAX_QUIZ_QUESTIONS: i64 = 20;

/// Default number of rows on a per-book leaderboard.
pub const BOOK_LEADERBOARD_LIMIT: i64 = 10;

/// Default number of rows on the global leaderboard.
pub const GLOBAL_LEADERBOARD_LIMIT: i64 = 20;

/// Hard cap for a caller-supplied `limit` query parameter.
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Domain used when deriving an account email from church code and username.
pub const EMAIL_DOMAIN: &str = "quizapp.local";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
        }
    }
}
