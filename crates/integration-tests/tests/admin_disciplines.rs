//! Integration tests for admin login, discipline management and users.
//!
//! Run with: cargo test -p lechare-integration-tests --test `admin_disciplines`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::json;

use lechare_integration_tests::{ADMIN_PASSWORD, TestAdmin, TestQuiz, sample_store};

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_api_requires_admin_session() {
    let admin = TestAdmin::spawn(sample_store(), None).await;

    let (status, body) = admin.get("/api/disciplines").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Admin login required");

    let (status, _) = admin.get("/api/users").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let admin = TestAdmin::spawn(sample_store(), None).await;

    let (status, body) = admin
        .post("/api/auth/login", &json!({ "password": "nope" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect password");

    let (status, _) = admin.get("/api/disciplines").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_then_logout() {
    let admin = TestAdmin::spawn(sample_store(), None).await;

    let (status, _) = admin
        .post("/api/auth/login", &json!({ "password": ADMIN_PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = admin.get("/api/disciplines").await;
    assert_eq!(status, StatusCode::OK);

    admin.post("/api/auth/logout", &json!({})).await;
    let (status, _) = admin.get("/api/disciplines").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Disciplines
// ============================================================================

#[tokio::test]
async fn test_list_includes_passwords_and_counts() {
    let admin = TestAdmin::spawn_logged_in(sample_store(), None).await;

    let (status, body) = admin.get("/api/disciplines").await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["password"], "poo");
    assert_eq!(list[0]["question_count"], 3);
    assert_eq!(list[2]["question_count"], 0);
}

#[tokio::test]
async fn test_detail_includes_questions() {
    let admin = TestAdmin::spawn_logged_in(sample_store(), None).await;

    let (status, body) = admin.get("/api/disciplines/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Gerenciamento de Projetos");
    assert_eq!(body["questions"][0]["question"], "O que é escopo?");

    let (status, _) = admin.get("/api/disciplines/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_discipline() {
    let admin = TestAdmin::spawn_logged_in(sample_store(), None).await;

    let (status, body) = admin
        .post(
            "/api/disciplines",
            &json!({ "name": "  Banco de Dados ", "password": "bd2024" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Banco de Dados");
    assert_eq!(body["question_count"], 0);

    let stored = admin.disciplines();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[3].name, "Banco de Dados");
}

#[tokio::test]
async fn test_create_rejects_duplicate_and_blank() {
    let admin = TestAdmin::spawn_logged_in(sample_store(), None).await;

    let (status, body) = admin
        .post("/api/disciplines", &json!({ "name": "poo", "password": "x" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = admin
        .post("/api/disciplines", &json!({ "name": "   ", "password": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(admin.disciplines().len(), 3);
}

#[tokio::test]
async fn test_update_keeps_questions() {
    let admin = TestAdmin::spawn_logged_in(sample_store(), None).await;

    let (status, body) = admin
        .put(
            "/api/disciplines/3",
            &json!({ "name": "Programação Orientada a Objetos", "password": "poo2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question_count"], 3);

    let poo = &admin.disciplines()[0];
    assert_eq!(poo.name, "Programação Orientada a Objetos");
    assert_eq!(poo.password, "poo2");
    assert_eq!(poo.questions.len(), 3);
}

#[tokio::test]
async fn test_update_to_another_disciplines_name_conflicts() {
    let admin = TestAdmin::spawn_logged_in(sample_store(), None).await;

    let (status, _) = admin
        .put("/api/disciplines/3", &json!({ "name": "VAZIA", "password": "poo" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = admin
        .put("/api/disciplines/3", &json!({ "name": "poo", "password": "nova" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_discipline() {
    let admin = TestAdmin::spawn_logged_in(sample_store(), None).await;

    assert_eq!(admin.delete("/api/disciplines/5").await, StatusCode::NO_CONTENT);
    assert_eq!(admin.delete("/api/disciplines/5").await, StatusCode::NOT_FOUND);
    assert_eq!(admin.disciplines().len(), 2);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_users_lists_profiles_without_hashes() {
    let quiz = TestQuiz::spawn(sample_store()).await;
    quiz.register("Ana", "ana@example.com", "segredo1").await;
    let users = quiz.state.store().users().unwrap();

    let store = sample_store();
    store.replace_users(&users).unwrap();
    let admin = TestAdmin::spawn_logged_in(store, None).await;

    let (status, body) = admin.get("/api/users").await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["email"], "ana@example.com");
    assert!(list[0]["createdAt"].is_string());
    assert!(list[0].get("password").is_none());
}
