//! Registered students.

use axum::{Json, Router, extract::State, routing::get};

use lechare_core::UserProfile;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/users", get(index))
}

/// List users without their password hashes.
///
/// GET /api/users
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<UserProfile>>> {
    let users = state.store().users()?;
    Ok(Json(users.iter().map(lechare_core::User::profile).collect()))
}
