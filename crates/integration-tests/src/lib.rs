//! Integration tests for Lechare Educacional.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lechare-integration-tests
//! ```
//!
//! Every test spawns its own quiz or admin server on an ephemeral port,
//! backed by an in-memory store. GitHub sync is exercised against
//! [`FakeGitHub`], a tiny contents API served from the same process.
//!
//! # Test Categories
//!
//! - `quiz_flow` - Unlock, register, login and quiz navigation
//! - `admin_disciplines` - Admin login, discipline CRUD, users
//! - `admin_transfer` - CSV import and export
//! - `admin_sync` - GitHub contents sync

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::get,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};

use lechare_admin::config::{AdminConfig, GitHubConfig};
use lechare_core::store::{JsonStore, MemoryStore};
use lechare_core::{Discipline, DisciplineId, Question};
use lechare_quiz::config::QuizConfig;

/// Password the test admin server accepts.
pub const ADMIN_PASSWORD: &str = "k9#Lm2$pQ7vX-teste";

/// Token the fake GitHub expects.
pub const GITHUB_TOKEN: &str = "ghp_k3Jd9QmX2vLp8RtY5wZa";

// =============================================================================
// Fixtures
// =============================================================================

/// Two seeded disciplines plus one without questions.
///
/// - `3` POO (`poo`): three questions, the second has no comment
/// - `4` Gerenciamento de Projetos (`gp`): one question
/// - `5` Vazia (`vazia`): no questions
#[must_use]
pub fn sample_disciplines() -> Vec<Discipline> {
    vec![
        Discipline {
            id: DisciplineId::new("3"),
            name: "POO".to_string(),
            password: "poo".to_string(),
            questions: vec![
                Question::new("1", "O que é encapsulamento?", "Esconder o estado", "Use getters"),
                Question::new("2", "O que é herança?", "Reuso de código", ""),
                Question::new("3", "O que é polimorfismo?", "Muitas formas", "Sobrescrita"),
            ],
        },
        Discipline {
            id: DisciplineId::new("4"),
            name: "Gerenciamento de Projetos".to_string(),
            password: "gp".to_string(),
            questions: vec![Question::new("1", "O que é escopo?", "O que será entregue", "PMBOK")],
        },
        Discipline {
            id: DisciplineId::new("5"),
            name: "Vazia".to_string(),
            password: "vazia".to_string(),
            questions: Vec::new(),
        },
    ]
}

/// An in-memory store holding [`sample_disciplines`] and no users.
#[must_use]
pub fn sample_store() -> JsonStore {
    let store: JsonStore = JsonStore::new(Box::new(MemoryStore::new()));
    store
        .replace_disciplines(&sample_disciplines())
        .expect("Failed to seed memory store");
    store
}

/// A client that keeps session cookies between requests.
#[must_use]
pub fn cookie_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    addr
}

// =============================================================================
// Quiz server
// =============================================================================

/// A running quiz server.
pub struct TestQuiz {
    pub base_url: String,
    pub client: Client,
    pub state: lechare_quiz::state::AppState,
}

impl TestQuiz {
    /// Spawn a quiz server over `store`.
    pub async fn spawn(store: JsonStore) -> Self {
        let config = QuizConfig {
            host: "127.0.0.1".parse().expect("valid IP"),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            data_dir: "data".into(),
            seed_dir: "seed".into(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = lechare_quiz::state::AppState::new(config, store);
        let addr = serve(lechare_quiz::app(state.clone())).await;

        Self {
            base_url: format!("http://{addr}"),
            client: cookie_client(),
            state,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body and return status plus parsed body.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        read_json(response).await
    }

    /// GET and return status plus parsed body.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        read_json(response).await
    }

    /// Register `name` and stay logged in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/register",
            &json!({
                "name": name,
                "email": email,
                "password": password,
                "password_confirm": password,
            }),
        )
        .await
    }

    /// Unlock a discipline with its access password.
    pub async fn unlock(&self, id: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            &format!("/api/disciplines/{id}/unlock"),
            &json!({ "password": password }),
        )
        .await
    }
}

// =============================================================================
// Admin server
// =============================================================================

/// A running admin server.
pub struct TestAdmin {
    pub base_url: String,
    pub client: Client,
    pub state: lechare_admin::state::AppState,
}

impl TestAdmin {
    /// Spawn an admin server over `store`, with GitHub sync when `github` is set.
    pub async fn spawn(store: JsonStore, github: Option<GitHubConfig>) -> Self {
        let config = AdminConfig {
            host: "127.0.0.1".parse().expect("valid IP"),
            port: 0,
            base_url: "http://localhost:3001".to_string(),
            admin_password: SecretString::from(ADMIN_PASSWORD),
            data_dir: "data".into(),
            seed_dir: "seed".into(),
            github,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = lechare_admin::state::AppState::new(config, store)
            .expect("Failed to build admin state");
        let addr = serve(lechare_admin::app(state.clone())).await;

        Self {
            base_url: format!("http://{addr}"),
            client: cookie_client(),
            state,
        }
    }

    /// Spawn and log in.
    pub async fn spawn_logged_in(store: JsonStore, github: Option<GitHubConfig>) -> Self {
        let admin = Self::spawn(store, github).await;
        let (status, _) = admin
            .post("/api/auth/login", &json!({ "password": ADMIN_PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed");
        admin
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        read_json(response).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        read_json(response).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        read_json(response).await
    }

    pub async fn delete(&self, path: &str) -> StatusCode {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Request failed")
            .status()
    }

    /// POST a raw CSV body.
    pub async fn post_csv(&self, path: &str, csv: &str) -> (StatusCode, Value) {
        self.post_csv_bytes(path, csv.as_bytes().to_vec()).await
    }

    /// POST raw bytes as a CSV upload.
    pub async fn post_csv_bytes(&self, path: &str, csv: Vec<u8>) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .header(header::CONTENT_TYPE, "text/csv")
            .body(csv)
            .send()
            .await
            .expect("Request failed");
        read_json(response).await
    }

    /// Current disciplines, read straight from the store.
    #[must_use]
    pub fn disciplines(&self) -> Vec<Discipline> {
        self.state
            .store()
            .disciplines()
            .expect("Failed to read store")
    }
}

async fn read_json(response: reqwest::Response) -> (StatusCode, Value) {
    let status = StatusCode::from_u16(response.status().as_u16()).expect("valid status");
    let text = response.text().await.expect("Failed to read body");
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    (status, body)
}

// =============================================================================
// Fake GitHub contents API
// =============================================================================

#[derive(Debug, Clone)]
struct FakeFile {
    sha: String,
    content: String,
}

#[derive(Debug, Default)]
struct FakeRepo {
    files: HashMap<String, FakeFile>,
    puts: Vec<Value>,
    refs: Vec<String>,
    authorizations: Vec<String>,
    requests: usize,
    failures_left: usize,
    reject_writes: bool,
    revision: usize,
}

/// An in-process stand-in for `GET`/`PUT /repos/{owner}/{repo}/contents/{path}`.
///
/// Files are stored decoded. A `PUT` whose `sha` does not match the stored
/// file is answered with 409, like GitHub does for a stale sha.
#[derive(Clone)]
pub struct FakeGitHub {
    pub api_url: String,
    repo: Arc<Mutex<FakeRepo>>,
}

impl FakeGitHub {
    pub async fn spawn() -> Self {
        let repo = Arc::new(Mutex::new(FakeRepo::default()));
        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(get_content).put(put_content),
            )
            .with_state(Arc::clone(&repo));
        let addr = serve(app).await;

        Self {
            api_url: format!("http://{addr}"),
            repo,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeRepo> {
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> GitHubConfig {
        GitHubConfig {
            token: SecretString::from(GITHUB_TOKEN),
            owner: "lelismura".to_string(),
            repo: "PeR---Disciplinas".to_string(),
            branch: "main".to_string(),
            api_url: self.api_url.clone(),
            snapshot_path: "public/disciplinas.json".to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_delay: Duration::from_millis(10),
        }
    }

    /// Put a file in the repository without going through the API.
    pub fn insert(&self, path: &str, content: &str) {
        let mut repo = self.lock();
        repo.revision += 1;
        let sha = format!("blob{}", repo.revision);
        repo.files.insert(
            path.to_string(),
            FakeFile {
                sha,
                content: content.to_string(),
            },
        );
    }

    /// Decoded content at `path`.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|f| f.content.clone())
    }

    /// Current sha at `path`.
    #[must_use]
    pub fn sha(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|f| f.sha.clone())
    }

    /// Every `PUT` body received, in order.
    #[must_use]
    pub fn puts(&self) -> Vec<Value> {
        self.lock().puts.clone()
    }

    /// `ref` query values received by `GET`, in order.
    #[must_use]
    pub fn refs(&self) -> Vec<String> {
        self.lock().refs.clone()
    }

    /// `Authorization` headers received, in order.
    #[must_use]
    pub fn authorizations(&self) -> Vec<String> {
        self.lock().authorizations.clone()
    }

    /// Total requests received, failed ones included.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.lock().requests
    }

    /// Answer the next `n` requests with 503.
    pub fn fail_next(&self, n: usize) {
        self.lock().failures_left = n;
    }

    /// Answer every `PUT` with 409.
    pub fn reject_writes(&self) {
        self.lock().reject_writes = true;
    }
}

type FakeState = Arc<Mutex<FakeRepo>>;

fn record(repo: &mut FakeRepo, headers: &HeaderMap) -> Option<(StatusCode, Json<Value>)> {
    repo.requests += 1;
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        repo.authorizations.push(auth.to_string());
    }
    if repo.failures_left > 0 {
        repo.failures_left -= 1;
        return Some((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Service Unavailable" })),
        ));
    }
    None
}

async fn get_content(
    State(repo): State<FakeState>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut repo = repo.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(failure) = record(&mut repo, &headers) {
        return failure;
    }
    if let Some(reference) = query.get("ref") {
        repo.refs.push(reference.clone());
    }

    match repo.files.get(&path) {
        Some(file) => (
            StatusCode::OK,
            Json(json!({
                "path": path,
                "sha": file.sha,
                "content": BASE64.encode(&file.content),
                "encoding": "base64",
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Not Found" })),
        ),
    }
}

async fn put_content(
    State(repo): State<FakeState>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut repo = repo.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(failure) = record(&mut repo, &headers) {
        return failure;
    }
    repo.puts.push(body.clone());

    let current_sha = repo.files.get(&path).map(|f| f.sha.clone());
    let sent_sha = body.get("sha").and_then(Value::as_str).map(str::to_string);
    if repo.reject_writes || current_sha != sent_sha {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": format!("{path} does not match {}", sent_sha.unwrap_or_default()) })),
        );
    }

    let Some(content) = body
        .get("content")
        .and_then(Value::as_str)
        .and_then(|c| BASE64.decode(c).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "content is not valid Base64" })),
        );
    };

    repo.revision += 1;
    let sha = format!("blob{}", repo.revision);
    let commit = format!("commit{}", repo.revision);
    let created = current_sha.is_none();
    repo.files.insert(
        path.clone(),
        FakeFile {
            sha: sha.clone(),
            content,
        },
    );

    (
        if created {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        },
        Json(json!({
            "content": { "path": path, "sha": sha },
            "commit": { "sha": commit },
        })),
    )
}
