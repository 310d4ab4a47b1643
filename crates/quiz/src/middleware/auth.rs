//! Authentication extractors.
//!
//! A quiz needs both gates passed in the same browser session: the
//! discipline's access password ([`RequireUnlocked`]) and a student login
//! ([`RequireStudent`]).

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use lechare_core::DisciplineId;

use crate::models::{CurrentUser, keys};

/// Extractor that requires a logged-in student.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireStudent(user): RequireStudent,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", user.name)
/// }
/// ```
pub struct RequireStudent(pub CurrentUser);

/// Extractor that requires a discipline unlocked in this session.
pub struct RequireUnlocked(pub DisciplineId);

/// Error returned when a gate has not been passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Session layer missing from the router.
    NoSession,
    /// No student logged in.
    NotLoggedIn,
    /// No discipline unlocked.
    NotUnlocked,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::NoSession => "Session unavailable",
            Self::NotLoggedIn => "Login required",
            Self::NotUnlocked => "Unlock a discipline first",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireStudent
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSession)?;

        let user: CurrentUser = session
            .get(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::NotLoggedIn)?;

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for RequireUnlocked
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NoSession)?;

        let id: DisciplineId = session
            .get(keys::UNLOCKED_DISCIPLINE)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::NotUnlocked)?;

        Ok(Self(id))
    }
}

/// Helper to set the current student in the session.
///
/// Switching to a different student drops the quiz in progress, and the
/// unlocked discipline when another student was logged in.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    // New identity, new session id.
    session.cycle_id().await?;

    let previous: Option<CurrentUser> = session.get(keys::CURRENT_USER).await?;
    if previous.as_ref().map(|p| &p.id) != Some(&user.id) {
        session.remove_value(keys::ACTIVE_QUIZ).await?;
        // The unlock belonged to the other student.
        if previous.is_some() {
            session.remove_value(keys::UNLOCKED_DISCIPLINE).await?;
        }
    }
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to record the discipline whose password was accepted.
///
/// Unlocking a different discipline drops any quiz in progress.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_unlocked_discipline(
    session: &Session,
    id: &DisciplineId,
) -> Result<(), tower_sessions::session::Error> {
    let previous: Option<DisciplineId> = session.get(keys::UNLOCKED_DISCIPLINE).await?;
    if previous.as_ref() != Some(id) {
        session.remove_value(keys::ACTIVE_QUIZ).await?;
    }
    session.insert(keys::UNLOCKED_DISCIPLINE, id).await
}

/// Helper to forget the student, the unlocked discipline and the quiz (logout / exit).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_student_session(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
