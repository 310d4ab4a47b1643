//! Discipline listing and unlock.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use lechare_core::{Discipline, DisciplineId};

use crate::error::Result;
use crate::middleware::set_unlocked_discipline;
use crate::services::AuthService;
use crate::state::AppState;

/// Public view of a discipline. Never carries the access password.
#[derive(Debug, Serialize)]
pub struct DisciplineSummary {
    pub id: DisciplineId,
    pub name: String,
    pub question_count: usize,
}

impl From<&Discipline> for DisciplineSummary {
    fn from(d: &Discipline) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            question_count: d.questions.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

/// List every discipline.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<DisciplineSummary>>> {
    let disciplines = state.store().disciplines()?;
    Ok(Json(disciplines.iter().map(DisciplineSummary::from).collect()))
}

/// Check a discipline's access password and remember it in the session.
#[instrument(skip_all, fields(discipline_id))]
pub async fn unlock(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<DisciplineId>,
    Json(body): Json<UnlockRequest>,
) -> Result<Json<DisciplineSummary>> {
    tracing::Span::current().record("discipline_id", id.as_str());

    let discipline = AuthService::new(state.store())
        .unlock_discipline(&id, &body.password)
        .inspect_err(|e| tracing::info!(error = %e, "Discipline unlock rejected"))?;

    set_unlocked_discipline(&session, &discipline.id).await?;
    tracing::info!(name = %discipline.name, "Discipline unlocked");

    Ok(Json(DisciplineSummary::from(&discipline)))
}
