//! Authentication route handlers for admin.
//!
//! One shared password, set through `ADMIN_PASSWORD`.

use axum::{
    Json, Router,
    extract::State,
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Check the admin password and open a session.
///
/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    if !state.check_admin_password(&body.password) {
        tracing::warn!("Rejected admin login");
        return Err(AppError::Unauthorized("Incorrect password".to_string()));
    }

    set_current_admin(&session, &CurrentAdmin::now()).await?;
    tracing::info!("Admin logged in");
    Ok(Json(json!({ "ok": true })))
}

/// Logout and clear session.
///
/// POST /api/auth/logout
async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_admin(&session).await?;
    Ok(Json(json!({ "ok": true })))
}
