//! Discipline management.
//!
//! Every write goes through [`JsonStore::update_disciplines`], so the check
//! for duplicate names and the write happen under the same lock.
//!
//! [`JsonStore::update_disciplines`]: lechare_core::store::JsonStore::update_disciplines

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use lechare_core::catalog;
use lechare_core::{Discipline, DisciplineId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::AdminDiscipline;
use crate::state::AppState;

/// Body of create and update.
#[derive(Debug, Deserialize)]
pub struct DisciplineForm {
    pub name: String,
    pub password: String,
}

/// Build the disciplines router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/disciplines", get(index).post(create))
        .route(
            "/api/disciplines/{id}",
            get(show).put(update).delete(remove),
        )
}

/// List disciplines with their access passwords and question counts.
///
/// GET /api/disciplines
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<AdminDiscipline>>> {
    let disciplines = state.store().disciplines()?;
    Ok(Json(disciplines.iter().map(AdminDiscipline::from).collect()))
}

/// One discipline with all of its questions.
///
/// GET /api/disciplines/{id}
async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DisciplineId>,
) -> Result<Json<Discipline>> {
    state
        .store()
        .disciplines()?
        .into_iter()
        .find(|d| d.id == id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("discipline {id}")))
}

/// POST /api/disciplines
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(form): Json<DisciplineForm>,
) -> Result<(StatusCode, Json<AdminDiscipline>)> {
    let created = state.store().update_disciplines(|list| {
        catalog::add_discipline(list, &form.name, &form.password).map_err(AppError::from)
    })?;

    tracing::info!(id = %created.id, name = %created.name, "Discipline created");
    Ok((StatusCode::CREATED, Json(AdminDiscipline::from(&created))))
}

/// Rename and/or change the access password.
///
/// PUT /api/disciplines/{id}
#[instrument(skip_all, fields(discipline_id))]
async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DisciplineId>,
    Json(form): Json<DisciplineForm>,
) -> Result<Json<AdminDiscipline>> {
    tracing::Span::current().record("discipline_id", id.as_str());

    let updated = state.store().update_disciplines(|list| {
        catalog::update_discipline(list, &id, &form.name, &form.password).map_err(AppError::from)
    })?;

    tracing::info!(name = %updated.name, "Discipline updated");
    Ok(Json(AdminDiscipline::from(&updated)))
}

/// Delete a discipline and its questions.
///
/// DELETE /api/disciplines/{id}
#[instrument(skip_all, fields(discipline_id))]
async fn remove(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DisciplineId>,
) -> Result<StatusCode> {
    tracing::Span::current().record("discipline_id", id.as_str());

    let removed = state
        .store()
        .update_disciplines(|list| catalog::remove_discipline(list, &id).map_err(AppError::from))?;

    tracing::info!(
        name = %removed.name,
        questions = removed.questions.len(),
        "Discipline removed"
    );
    Ok(StatusCode::NO_CONTENT)
}
