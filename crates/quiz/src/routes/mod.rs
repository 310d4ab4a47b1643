//! HTTP route handlers for the quiz site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Disciplines
//! GET  /api/disciplines                 - List disciplines (id, name, question count)
//! POST /api/disciplines/{id}/unlock     - Check access password, remember in session
//!
//! # Auth
//! POST /api/auth/register               - Create account and log in
//! POST /api/auth/login                  - Log in
//! POST /api/auth/logout                 - Log out (also forgets discipline and quiz)
//! GET  /api/me                          - Current student and unlocked discipline
//!
//! # Quiz (requires login; start also requires an unlocked discipline)
//! POST /api/quiz/start                  - Shuffle and show the first question
//! GET  /api/quiz                        - Current view
//! POST /api/quiz/next                   - Next question
//! POST /api/quiz/prev                   - Previous question
//! POST /api/quiz/answer                 - Toggle answer
//! POST /api/quiz/comment                - Toggle comment
//! POST /api/quiz/restart                - Reshuffle from scratch
//! POST /api/quiz/exit                   - Leave (same as logout)
//! ```

pub mod auth;
pub mod disciplines;
pub mod quiz;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the discipline routes router.
pub fn discipline_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(disciplines::index))
        .route("/{id}/unlock", post(disciplines::unlock))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the quiz routes router.
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(quiz::show))
        .route("/start", post(quiz::start))
        .route("/next", post(quiz::next))
        .route("/prev", post(quiz::prev))
        .route("/answer", post(quiz::toggle_answer))
        .route("/comment", post(quiz::toggle_comment))
        .route("/restart", post(quiz::restart))
        .route("/exit", post(quiz::exit))
}

/// Create all routes for the quiz site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/disciplines", discipline_routes())
        .nest("/api/auth", auth_routes())
        .route("/api/me", get(auth::me))
        .nest("/api/quiz", quiz_routes())
}
