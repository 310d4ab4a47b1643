//! CSV import and export.
//!
//! Import bodies are the raw CSV bytes and must be UTF-8. Parsing happens
//! inside the store's update closure, so a rejected file leaves the
//! collection untouched.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use lechare_core::export::{self, CsvFile};
use lechare_core::import::{self, DisciplineImportSummary, GlobalImportSummary, ImportError};
use lechare_core::DisciplineId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// A CSV file served as a download.
pub struct CsvDownload(pub CsvFile);

impl IntoResponse for CsvDownload {
    fn into_response(self) -> Response {
        let CsvFile { filename, content } = self.0;
        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            content,
        )
            .into_response()
    }
}

/// Decode an uploaded file, reporting non-UTF-8 input as an import error.
fn csv_text(body: &Bytes) -> Result<String> {
    String::from_utf8(body.to_vec()).map_err(|e| {
        ImportError::Parse(vec![format!(
            "the file is not UTF-8 (invalid byte at offset {}); save it as \"CSV UTF-8\"",
            e.utf8_error().valid_up_to()
        )])
        .into()
    })
}

/// Build the import/export router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/disciplines/{id}/import", post(import_discipline))
        .route("/api/disciplines/{id}/export", get(export_discipline))
        .route("/api/import", post(import_all))
        .route("/api/export", get(export_all))
}

/// Replace one discipline's questions with the uploaded file.
///
/// POST /api/disciplines/{id}/import
#[instrument(skip_all, fields(discipline_id, bytes = body.len()))]
async fn import_discipline(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DisciplineId>,
    body: Bytes,
) -> Result<Json<DisciplineImportSummary>> {
    tracing::Span::current().record("discipline_id", id.as_str());
    let body = csv_text(&body)?;

    let summary = state.store().update_disciplines(|list| {
        import::import_into_discipline(list, &id, &body).map_err(AppError::from)
    })?;

    tracing::info!(
        name = %summary.discipline_name,
        imported = summary.imported,
        skipped = summary.skipped_lines.len(),
        "Discipline questions replaced"
    );
    Ok(Json(summary))
}

/// Append rows to the disciplines named in the file.
///
/// POST /api/import
#[instrument(skip_all, fields(bytes = body.len()))]
async fn import_all(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    body: Bytes,
) -> Result<Json<GlobalImportSummary>> {
    let body = csv_text(&body)?;
    let summary = state
        .store()
        .update_disciplines(|list| import::import_global(list, &body).map_err(AppError::from))?;

    tracing::info!(
        imported = summary.imported,
        disciplines = summary.matched_disciplines,
        unmatched = summary.unmatched.len(),
        skipped = summary.skipped_lines.len(),
        "Global import finished"
    );
    Ok(Json(summary))
}

/// GET /api/disciplines/{id}/export
async fn export_discipline(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DisciplineId>,
) -> Result<CsvDownload> {
    let discipline = state
        .store()
        .disciplines()?
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| AppError::NotFound(format!("discipline {id}")))?;

    Ok(CsvDownload(export::export_discipline(&discipline)?))
}

/// Every question of every discipline in one file.
///
/// GET /api/export
async fn export_all(State(state): State<AppState>, _admin: RequireAdmin) -> Result<CsvDownload> {
    let disciplines = state.store().disciplines()?;
    let today = chrono::Local::now().date_naive();
    Ok(CsvDownload(export::export_all(&disciplines, today)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_csv_download_headers() {
        let response = CsvDownload(CsvFile {
            filename: "poo_questoes.csv".to_string(),
            content: "\u{feff}number,question,answer,comment\n".to_string(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"poo_questoes.csv\""
        );
    }
    #[test]
    fn test_csv_text_rejects_latin1() {
        // "Número" saved as Windows-1252.
        let latin1 = Bytes::from_static(b"N\xfamero,pergunta\n");
        let err = csv_text(&latin1).unwrap_err();
        assert!(matches!(err, AppError::Import(ImportError::Parse(_))));
        assert!(err.to_string().contains("offset 1"));

        let utf8 = Bytes::from("Número,pergunta\n");
        assert_eq!(csv_text(&utf8).unwrap(), "Número,pergunta\n");
    }
}
