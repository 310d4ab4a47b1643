//! Unified error handling for admin.
//!
//! Responses are JSON `{"error": "..."}`. Import failures also carry the
//! rejected line numbers and unmatched discipline names so the panel can show
//! them next to the message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use lechare_core::catalog::CatalogError;
use lechare_core::export::ExportError;
use lechare_core::import::ImportError;
use lechare_core::store::StoreError;

use crate::github::GitHubError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Discipline create/update/delete rejected.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// CSV import rejected.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// CSV export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// GitHub sync failed.
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Snapshot serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Admin is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Optional feature not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) | Self::Session(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Catalog(err) => match err {
                CatalogError::Blank => StatusCode::BAD_REQUEST,
                CatalogError::DuplicateName(_) => StatusCode::CONFLICT,
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            },
            Self::Import(err) => match err {
                ImportError::UnknownDiscipline(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Export(err) => match err {
                ExportError::NoQuestions => StatusCode::BAD_REQUEST,
                ExportError::Csv(_) | ExportError::Encoding(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::GitHub(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Response body. Internal details stay in the logs.
    fn body(&self) -> Value {
        match self {
            Self::Store(_)
            | Self::Session(_)
            | Self::Serialization(_)
            | Self::Internal(_)
            | Self::Export(ExportError::Csv(_) | ExportError::Encoding(_)) => {
                json!({ "error": "Internal server error" })
            }
            Self::Import(err) => match err {
                ImportError::NoValidRows { skipped_lines } => {
                    json!({ "error": err.to_string(), "skipped_lines": skipped_lines })
                }
                ImportError::NoMatchingDiscipline {
                    unmatched,
                    skipped_lines,
                } => json!({
                    "error": err.to_string(),
                    "unmatched": unmatched,
                    "skipped_lines": skipped_lines,
                }),
                _ => json!({ "error": err.to_string() }),
            },
            Self::Catalog(err) => json!({ "error": err.to_string() }),
            Self::Export(err) => json!({ "error": err.to_string() }),
            Self::GitHub(err) => json!({ "error": err.to_string() }),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::ServiceUnavailable(msg) => json!({ "error": msg }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use lechare_core::DisciplineId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("discipline 9".to_string());
        assert_eq!(err.to_string(), "Not found: discipline 9");

        let err = AppError::BadRequest("empty body".to_string());
        assert_eq!(err.to_string(), "Bad request: empty body");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::ServiceUnavailable("test".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(
            get_status(CatalogError::DuplicateName("POO".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CatalogError::Blank.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ImportError::UnknownDiscipline(DisciplineId::new("9")).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ImportError::Malformed.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ExportError::NoQuestions.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                GitHubError::Conflict {
                    path: "a.json".to_string(),
                    message: "stale".to_string(),
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_import_body_carries_lines() {
        let err = AppError::from(ImportError::NoMatchingDiscipline {
            unmatched: vec!["Física".to_string()],
            skipped_lines: vec![3, 5],
        });
        let body = err.body();
        assert_eq!(body["unmatched"][0], "Física");
        assert_eq!(body["skipped_lines"], json!([3, 5]));
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("disk on fire".to_string());
        assert_eq!(err.body()["error"], "Internal server error");
    }
}
