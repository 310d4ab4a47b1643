//! Push content to the GitHub repository that hosts the published site.
//!
//! Nothing local changes here. A failed push is reported and the store is
//! left as it was.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::github::{GitHubClient, SyncOutcome};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Body of a raw sync.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub path: String,
    pub content: String,
}

/// Response of a successful sync.
#[derive(Debug, serde::Serialize)]
pub struct SyncResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// Build the sync router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sync", post(sync_file))
        .route("/api/sync/disciplines", post(sync_disciplines))
}

fn github(state: &AppState) -> Result<&GitHubClient> {
    state
        .github()
        .ok_or_else(|| AppError::ServiceUnavailable("GitHub sync is not configured".to_string()))
}

/// Write `content` to `path` in the repository.
///
/// POST /api/sync
#[instrument(skip_all, fields(path))]
async fn sync_file(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(body): Json<SyncRequest>,
) -> Result<Json<SyncResponse>> {
    tracing::Span::current().record("path", body.path.as_str());

    let client = github(&state)?;
    let outcome = client.update_file(&body.path, &body.content).await?;

    tracing::info!(
        branch = client.branch(),
        commit = %outcome.commit_sha,
        created = outcome.created,
        "File synced to GitHub"
    );
    Ok(Json(SyncResponse { ok: true, outcome }))
}

/// Publish the current disciplines as pretty JSON at the snapshot path.
///
/// POST /api/sync/disciplines
#[instrument(skip_all)]
async fn sync_disciplines(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<SyncResponse>> {
    let client = github(&state)?;
    let path = state
        .config()
        .github()
        .map(|g| g.snapshot_path.clone())
        .ok_or_else(|| AppError::ServiceUnavailable("GitHub sync is not configured".to_string()))?;

    let disciplines = state.store().disciplines()?;
    let content = serde_json::to_string_pretty(&disciplines)?;
    let outcome = client.update_file(&path, &content).await?;

    tracing::info!(
        path = %path,
        disciplines = disciplines.len(),
        commit = %outcome.commit_sha,
        "Disciplines snapshot synced to GitHub"
    );
    Ok(Json(SyncResponse { ok: true, outcome }))
}
