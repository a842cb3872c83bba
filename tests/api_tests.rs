// tests/api_tests.rs

use std::sync::Arc;

use bible_quiz::{config::Config, routes, state::AppState, store::MemoryStore};
use serde_json::{Value, json};

/// Spawns the app on a random port, backed by a fresh in-memory store.
///
/// Seeds two books: "Kejadian" (id 1) with three questions whose answer is
/// "A", and "Keluaran" (id 2) without questions.
async fn spawn_app() -> String {
    let store = Arc::new(MemoryStore::new());
    let genesis = store.add_book("Kejadian");
    store.add_book("Keluaran");
    for i in 1..=3 {
        store.add_question(genesis.id, &format!("Question {}", i), ["A", "B", "C", "D"], "A");
    }

    let config = Config {
        database_url: "memory".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        port: 0,
    };

    let app = routes::create_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn register(client: &reqwest::Client, address: &str, church_code: &str, username: &str) -> String {
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({
            "church_code": church_code,
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    body["token"].as_str().expect("Token not found").to_string()
}

async fn complete(client: &reqwest::Client, address: &str, token: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/api/quiz/complete", address))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Complete failed")
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({"church_code": "GRC01", "username": "ana", "password": "12345"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn username_is_unique_per_church_code() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    register(&client, &address, "GRC01", "ana").await;

    let duplicate = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({"church_code": "GRC01", "username": "ana", "password": "password123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 409);

    // Same username under another church is a different account.
    register(&client, &address, "GRC02", "ana").await;
}

#[tokio::test]
async fn hyphenated_identities_cannot_collide() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // ("c", "a-b") and ("b-c", "a") would share the derived email a-b-c@...
    for (church, username) in [("c", "a-b"), ("b-c", "a")] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&json!({"church_code": church, "username": username, "password": "password123"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    register(&client, &address, "c", "ab").await;
    register(&client, &address, "bc", "a").await;

    let login: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({"church_code": "bc", "username": "a", "password": "password123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(login["username"], "a");
    assert_eq!(login["church_code"], "bc");
}

#[tokio::test]
async fn login_checks_identity_and_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    register(&client, &address, "GRC01", "ana").await;

    let login = |church: &'static str, password: &'static str| {
        client
            .post(format!("{}/api/auth/login", address))
            .json(&json!({"church_code": church, "username": "ana", "password": password}))
            .send()
    };

    assert_eq!(login("GRC01", "wrong-password").await.unwrap().status().as_u16(), 401);
    assert_eq!(login("GRC99", "password123").await.unwrap().status().as_u16(), 401);

    let ok = login("GRC01", "password123").await.unwrap();
    assert_eq!(ok.status().as_u16(), 200);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["type"], "Bearer");
    assert_eq!(body["username"], "ana");

    let me: Value = client
        .get(format!("{}/api/auth/me", address))
        .bearer_auth(body["token"].as_str().unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["church_code"], "GRC01");
    assert_eq!(me["attempts_count"], 0);
}

#[tokio::test]
async fn quiz_routes_require_a_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let paper = client
        .get(format!("{}/api/books/1/quiz", address))
        .send()
        .await
        .unwrap();
    assert_eq!(paper.status().as_u16(), 401);

    let submit = client
        .post(format!("{}/api/quiz/complete", address))
        .bearer_auth("not-a-token")
        .json(&json!({"book_id": 1, "score": 1, "total_questions": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(submit.status().as_u16(), 401);
}

#[tokio::test]
async fn quiz_flow_keeps_best_score() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register(&client, &address, "GRC01", "ana").await;

    // 1. Books are public
    let books: Vec<Value> = client
        .get(format!("{}/api/books", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["name"], "Kejadian");

    // 2. Fetch a quiz; answers stay on the server
    let paper: Value = client
        .get(format!("{}/api/books/1/quiz", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(paper["total_questions"], 3);
    let first = &paper["questions"][0];
    assert!(first.get("correct_answer").is_none());
    assert_eq!(first["options"].as_array().unwrap().len(), 4);

    // 3. Check an answer
    let checked: Value = client
        .post(format!("{}/api/quiz/answer", address))
        .bearer_auth(&token)
        .json(&json!({"question_id": first["id"], "answer": "B"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(checked["correct"], false);
    assert_eq!(checked["correct_answer"], "A");

    // 4. Complete twice, the lower score does not replace the best
    let result: Value = complete(&client, &address, &token, json!({"book_id": 1, "score": 2, "total_questions": 3}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["final_score"], 2);

    let result: Value = complete(&client, &address, &token, json!({"book_id": 1, "score": 1, "total_questions": 3}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(result["final_score"], 2);
    assert_eq!(result["leaderboard_updated"], false);
    assert_eq!(result["history_write_ok"], true);

    // 5. Results page and history
    let best: Value = client
        .get(format!("{}/api/quiz/results/1", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(best["best_score"], 2);
    assert_eq!(best["book_name"], "Kejadian");

    let history: Vec<Value> = client
        .get(format!("{}/api/scores/me", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["book_name"], "Kejadian");
}

#[tokio::test]
async fn complete_rejects_invalid_score_and_unknown_book() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register(&client, &address, "GRC01", "ana").await;

    let too_high = complete(&client, &address, &token, json!({"book_id": 1, "score": 4, "total_questions": 3})).await;
    assert_eq!(too_high.status().as_u16(), 400);

    let negative = complete(&client, &address, &token, json!({"book_id": 1, "score": -1, "total_questions": 3})).await;
    assert_eq!(negative.status().as_u16(), 400);

    let unknown = complete(&client, &address, &token, json!({"book_id": 99, "score": 1, "total_questions": 3})).await;
    assert_eq!(unknown.status().as_u16(), 404);

    let not_a_number = complete(&client, &address, &token, json!({"book_id": 1, "score": "abc", "total_questions": 3})).await;
    assert_eq!(not_a_number.status().as_u16(), 400);
    let body: Value = not_a_number.json().await.unwrap();
    assert!(body["error"].is_string());

    let history: Vec<Value> = client
        .get(format!("{}/api/scores/me", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn book_without_questions_has_no_quiz() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register(&client, &address, "GRC01", "ana").await;

    let response = client
        .get(format!("{}/api/books/2/quiz", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn leaderboards_rank_by_score() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let ana = register(&client, &address, "GRC01", "ana").await;
    let ben = register(&client, &address, "GRC01", "ben").await;

    complete(&client, &address, &ben, json!({"book_id": 1, "score": 2, "total_questions": 3})).await;
    complete(&client, &address, &ana, json!({"book_id": 1, "score": 3, "total_questions": 3})).await;

    let board: Value = client
        .get(format!("{}/api/leaderboard/1", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["book_name"], "Kejadian");
    let rows = board["leaderboard"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["username"], "ana");
    assert_eq!(rows[0]["score"], 3);
    assert_eq!(rows[1]["username"], "ben");

    let global: Vec<Value> = client
        .get(format!("{}/api/leaderboard?limit=1", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(global.len(), 1);
    assert_eq!(global[0]["username"], "ana");
    assert_eq!(global[0]["book_name"], "Kejadian");

    let missing = client
        .get(format!("{}/api/leaderboard/99", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}
