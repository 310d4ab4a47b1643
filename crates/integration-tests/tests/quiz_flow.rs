//! Integration tests for the public quiz site.
//!
//! Each test spawns a quiz server over an in-memory store holding
//! the sample disciplines.
//!
//! Run with: cargo test -p lechare-integration-tests --test `quiz_flow`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashSet;

use reqwest::StatusCode;
use serde_json::{Value, json};

use lechare_integration_tests::{TestQuiz, sample_store};

/// Spawn, register a student and unlock POO.
async fn ready_for_poo() -> TestQuiz {
    let quiz = TestQuiz::spawn(sample_store()).await;
    let (status, _) = quiz.register("Ana", "ana@example.com", "segredo1").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = quiz.unlock("3", "poo").await;
    assert_eq!(status, StatusCode::OK);
    quiz
}

fn question_text(view: &Value) -> String {
    view["question"]["question"].as_str().unwrap().to_string()
}

// ============================================================================
// Disciplines
// ============================================================================

#[tokio::test]
async fn test_health() {
    let quiz = TestQuiz::spawn(sample_store()).await;
    let response = quiz.client.get(quiz.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_discipline_list_hides_passwords() {
    let quiz = TestQuiz::spawn(sample_store()).await;

    let (status, body) = quiz.get("/api/disciplines").await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["id"], "3");
    assert_eq!(list[0]["name"], "POO");
    assert_eq!(list[0]["question_count"], 3);
    assert!(list.iter().all(|d| d.get("password").is_none()));
}

#[tokio::test]
async fn test_unlock_rejects_wrong_password() {
    let quiz = TestQuiz::spawn(sample_store()).await;

    let (status, body) = quiz.unlock("3", "errada").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (_, me) = quiz.get("/api/me").await;
    assert!(me["unlocked_discipline"].is_null());
}

#[tokio::test]
async fn test_unlock_unknown_discipline() {
    let quiz = TestQuiz::spawn(sample_store()).await;
    let (status, _) = quiz.unlock("99", "poo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unlock_is_remembered() {
    let quiz = TestQuiz::spawn(sample_store()).await;

    let (status, body) = quiz.unlock("4", "gp").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Gerenciamento de Projetos");

    let (_, me) = quiz.get("/api/me").await;
    assert_eq!(me["unlocked_discipline"], "4");
    assert!(me["user"].is_null());
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_register_logs_in_without_leaking_hash() {
    let quiz = TestQuiz::spawn(sample_store()).await;

    let (status, body) = quiz.register("Ana", "ana@example.com", "segredo1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ana");
    assert!(body.get("password").is_none());

    let (_, me) = quiz.get("/api/me").await;
    assert_eq!(me["user"]["name"], "Ana");

    let stored = quiz.state.store().users().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].password.starts_with("$argon2"));
}

#[tokio::test]
async fn test_register_validation() {
    let quiz = TestQuiz::spawn(sample_store()).await;

    let (status, _) = quiz
        .post(
            "/api/auth/register",
            &json!({
                "name": "Ana",
                "email": "ana@example.com",
                "password": "segredo1",
                "password_confirm": "segredo2",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = quiz.register("", "ana@example.com", "segredo1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = quiz.register("Ana", "sem-arroba", "segredo1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(quiz.state.store().users().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_case_insensitive() {
    let quiz = TestQuiz::spawn(sample_store()).await;
    quiz.register("Ana", "ana@example.com", "segredo1").await;

    let other = TestQuiz {
        base_url: quiz.base_url.clone(),
        client: lechare_integration_tests::cookie_client(),
        state: quiz.state.clone(),
    };
    let (status, _) = other.register("Ana 2", "ANA@example.com", "outra123").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_and_logout() {
    let quiz = TestQuiz::spawn(sample_store()).await;
    quiz.register("Ana", "ana@example.com", "segredo1").await;
    quiz.unlock("3", "poo").await;
    quiz.post("/api/auth/logout", &json!({})).await;

    let (_, me) = quiz.get("/api/me").await;
    assert!(me["user"].is_null());
    assert!(me["unlocked_discipline"].is_null());

    let (status, _) = quiz
        .post(
            "/api/auth/login",
            &json!({ "email": "ana@example.com", "password": "errada" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = quiz
        .post(
            "/api/auth/login",
            &json!({ "email": "Ana@Example.com", "password": "segredo1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");
}

#[tokio::test]
async fn test_switching_student_drops_quiz_and_unlock() {
    let quiz = ready_for_poo().await;
    quiz.post("/api/quiz/start", &json!({})).await;

    let other = TestQuiz {
        base_url: quiz.base_url.clone(),
        client: lechare_integration_tests::cookie_client(),
        state: quiz.state.clone(),
    };
    other.register("Bia", "bia@example.com", "segredo2").await;

    let (status, _) = quiz
        .post(
            "/api/auth/login",
            &json!({ "email": "bia@example.com", "password": "segredo2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = quiz.get("/api/quiz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No quiz in progress");
    let (_, me) = quiz.get("/api/me").await;
    assert_eq!(me["user"]["name"], "Bia");
    assert!(me["unlocked_discipline"].is_null());
}

#[tokio::test]
async fn test_logging_in_again_keeps_quiz() {
    let quiz = ready_for_poo().await;
    quiz.post("/api/quiz/start", &json!({})).await;
    quiz.post("/api/quiz/next", &json!({})).await;

    let (status, _) = quiz
        .post(
            "/api/auth/login",
            &json!({ "email": "ana@example.com", "password": "segredo1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, view) = quiz.get("/api/quiz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["progress"]["seen"], 2);
}

// ============================================================================
// Quiz
// ============================================================================

#[tokio::test]
async fn test_start_requires_login_and_unlock() {
    let quiz = TestQuiz::spawn(sample_store()).await;

    let (status, _) = quiz.post("/api/quiz/start", &json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    quiz.register("Ana", "ana@example.com", "segredo1").await;
    let (status, body) = quiz.post("/api/quiz/start", &json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unlock a discipline first");
}

#[tokio::test]
async fn test_navigation_shows_every_question_before_reshuffle() {
    let quiz = ready_for_poo().await;

    let (status, view) = quiz.post("/api/quiz/start", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "active");
    assert_eq!(view["discipline"], "POO");
    assert_eq!(view["user"], "Ana");
    assert_eq!(view["progress"]["seen"], 1);
    assert_eq!(view["progress"]["total"], 3);
    assert_eq!(view["can_go_back"], false);

    let mut seen = HashSet::from([question_text(&view)]);
    for expected in 2..=3 {
        let (_, view) = quiz.post("/api/quiz/next", &json!({})).await;
        assert_eq!(view["event"], "advanced");
        assert_eq!(view["progress"]["seen"], expected);
        seen.insert(question_text(&view));
    }
    assert_eq!(seen.len(), 3);

    let (_, view) = quiz.post("/api/quiz/next", &json!({})).await;
    assert_eq!(view["event"], "reshuffled");
    assert_eq!(view["progress"]["seen"], 1);
}

#[tokio::test]
async fn test_prev_and_replay_keep_history() {
    let quiz = ready_for_poo().await;

    let (_, first) = quiz.post("/api/quiz/start", &json!({})).await;
    let (_, second) = quiz.post("/api/quiz/next", &json!({})).await;

    let (_, back) = quiz.post("/api/quiz/prev", &json!({})).await;
    assert_eq!(back["event"], "moved_back");
    assert_eq!(question_text(&back), question_text(&first));

    let (_, unchanged) = quiz.post("/api/quiz/prev", &json!({})).await;
    assert_eq!(unchanged["event"], "unchanged");

    let (_, replay) = quiz.post("/api/quiz/next", &json!({})).await;
    assert_eq!(replay["event"], "replayed");
    assert_eq!(question_text(&replay), question_text(&second));
}

#[tokio::test]
async fn test_answer_toggle_and_hidden_after_navigation() {
    let quiz = ready_for_poo().await;

    let (_, view) = quiz.post("/api/quiz/start", &json!({})).await;
    assert!(view["question"]["answer"].is_null());

    let (_, view) = quiz.post("/api/quiz/answer", &json!({})).await;
    assert!(view["question"]["answer"].is_string());

    let (_, view) = quiz.post("/api/quiz/next", &json!({})).await;
    assert!(view["question"]["answer"].is_null());
}

#[tokio::test]
async fn test_comment_toggle_reports_missing_comment() {
    let quiz = ready_for_poo().await;
    quiz.post("/api/quiz/start", &json!({})).await;

    // Walk until the question without a comment comes up.
    let mut view = quiz.get("/api/quiz").await.1;
    while view["has_comment"] == true {
        view = quiz.post("/api/quiz/next", &json!({})).await.1;
    }
    assert_eq!(question_text(&view), "O que é herança?");

    let (_, view) = quiz.post("/api/quiz/comment", &json!({})).await;
    assert_eq!(view["event"], "no_comment");
    assert!(view["question"]["comment"].is_null());
}

#[tokio::test]
async fn test_question_count_change_restarts_quiz() {
    let quiz = ready_for_poo().await;
    quiz.post("/api/quiz/start", &json!({})).await;
    quiz.post("/api/quiz/next", &json!({})).await;

    let mut disciplines = quiz.state.store().disciplines().unwrap();
    disciplines[0].questions.truncate(1);
    quiz.state.store().replace_disciplines(&disciplines).unwrap();

    let (status, view) = quiz.get("/api/quiz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["progress"]["seen"], 1);
    assert_eq!(view["progress"]["total"], 1);
    assert_eq!(question_text(&view), "O que é encapsulamento?");
}

#[tokio::test]
async fn test_empty_discipline() {
    let quiz = TestQuiz::spawn(sample_store()).await;
    quiz.register("Ana", "ana@example.com", "segredo1").await;
    quiz.unlock("5", "vazia").await;

    let (status, view) = quiz.post("/api/quiz/start", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "empty");
    assert!(view["question"].is_null());
    assert_eq!(view["progress"]["total"], 0);

    let (_, view) = quiz.post("/api/quiz/next", &json!({})).await;
    assert_eq!(view["status"], "empty");
}

#[tokio::test]
async fn test_restart_and_exit() {
    let quiz = ready_for_poo().await;
    quiz.post("/api/quiz/start", &json!({})).await;
    quiz.post("/api/quiz/next", &json!({})).await;

    let (_, view) = quiz.post("/api/quiz/restart", &json!({})).await;
    assert_eq!(view["progress"]["seen"], 1);
    assert_eq!(view["can_go_back"], false);

    let (status, _) = quiz.post("/api/quiz/exit", &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = quiz.get("/api/quiz").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, me) = quiz.get("/api/me").await;
    assert!(me["unlocked_discipline"].is_null());
}
