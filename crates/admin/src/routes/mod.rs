//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Auth (shared admin password)
//! POST /api/auth/login                  - Login
//! POST /api/auth/logout                 - Logout
//!
//! # Disciplines
//! GET    /api/disciplines               - List (with passwords and question counts)
//! POST   /api/disciplines               - Create
//! GET    /api/disciplines/{id}          - Detail with questions
//! PUT    /api/disciplines/{id}          - Rename / change password
//! DELETE /api/disciplines/{id}          - Remove
//!
//! # CSV
//! POST /api/disciplines/{id}/import     - Replace one discipline's questions
//! GET  /api/disciplines/{id}/export     - Download one discipline
//! POST /api/import                      - Append to disciplines named in the file
//! GET  /api/export                      - Download everything
//!
//! # Users
//! GET  /api/users                       - Registered students
//!
//! # GitHub sync (503 when not configured)
//! POST /api/sync                        - Write {path, content}
//! POST /api/sync/disciplines            - Publish the disciplines snapshot
//! ```
//!
//! Everything except login, logout and health requires an admin session.

pub mod auth;
pub mod disciplines;
pub mod sync;
pub mod transfer;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(disciplines::router())
        .merge(transfer::router())
        .merge(users::router())
        .merge(sync::router())
}
