// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, leaderboard, profile, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, books, quiz, scores, leaderboard).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (stores, score recorder, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:5000"),
        HeaderValue::from_static("http://127.0.0.1:5000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_login = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(profile::get_me))
                .layer(require_login.clone()),
        );

    let book_routes = Router::new()
        .route("/", get(quiz::list_books))
        .merge(
            Router::new()
                .route("/{id}/quiz", get(quiz::generate_paper))
                .layer(require_login.clone()),
        );

    let quiz_routes = Router::new()
        .route("/answer", post(quiz::check_answer))
        .route("/complete", post(quiz::complete_quiz))
        .route("/results/{book_id}", get(quiz::get_result))
        .layer(require_login.clone());

    let score_routes = Router::new()
        .route("/me", get(profile::list_my_scores))
        .layer(require_login);

    let leaderboard_routes = Router::new()
        .route("/", get(leaderboard::global_leaderboard))
        .route("/{book_id}", get(leaderboard::book_leaderboard));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/books", book_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/scores", score_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
