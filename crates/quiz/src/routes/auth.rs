//! Student authentication route handlers.
//!
//! JSON endpoints for registration, login, logout and the current identity.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use lechare_core::{DisciplineId, UserProfile};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_student_session, set_current_user};
use crate::models::{CurrentUser, keys};
use crate::services::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Who is on the other end of this session.
#[derive(Debug, Serialize)]
pub struct Me {
    pub user: Option<CurrentUser>,
    pub unlocked_discipline: Option<DisciplineId>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account and log it in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<Registration>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let user = AuthService::new(state.store())
        .register(&form)
        .inspect_err(|e| tracing::info!(error = %e, "Registration rejected"))?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Student registered");

    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// Log a student in.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserProfile>> {
    let user = AuthService::new(state.store())
        .login(&body.email, &body.password)
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Student logged in");

    Ok(Json(user.profile()))
}

/// Log out, forgetting the unlocked discipline and any quiz in progress.
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_student_session(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "ok": true })))
}

/// Current student and unlocked discipline, if any.
pub async fn me(session: Session) -> Result<Json<Me>> {
    let user = session.get(keys::CURRENT_USER).await?;
    let unlocked_discipline = session.get(keys::UNLOCKED_DISCIPLINE).await?;
    Ok(Json(Me {
        user,
        unlocked_discipline,
    }))
}
