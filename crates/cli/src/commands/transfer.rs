//! CSV import and export commands.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use lechare_core::export;
use lechare_core::import;
use lechare_core::store::JsonStore;
use lechare_core::DisciplineId;

use super::CommandError;

/// Import a CSV file.
///
/// With a discipline id the file replaces that discipline's questions;
/// without one, rows are appended to the disciplines named in the file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the import is rejected.
pub async fn import(
    store: &JsonStore,
    file: &Path,
    discipline: Option<&DisciplineId>,
) -> Result<(), CommandError> {
    let payload = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| CommandError::file(file, e))?;

    info!(path = %file.display(), "Importing questions");

    let skipped_lines = if let Some(id) = discipline {
        let summary = store.update_disciplines(|list| {
            import::import_into_discipline(list, id, &payload).map_err(CommandError::from)
        })?;
        info!(
            "Replaced {} with {} questions",
            summary.discipline_name, summary.imported
        );
        summary.skipped_lines
    } else {
        let summary = store.update_disciplines(|list| {
            import::import_global(list, &payload).map_err(CommandError::from)
        })?;
        info!(
            "Imported {} questions into {} disciplines",
            summary.imported, summary.matched_disciplines
        );
        for name in &summary.unmatched {
            warn!("  No discipline named '{name}', rows skipped");
        }
        summary.skipped_lines
    };

    if !skipped_lines.is_empty() {
        warn!("  Invalid rows skipped at lines: {skipped_lines:?}");
    }
    Ok(())
}

/// Export one discipline, or everything, to a CSV file.
///
/// # Errors
///
/// Returns an error if there is nothing to export or the file cannot be written.
pub async fn export(
    store: &JsonStore,
    discipline: Option<&DisciplineId>,
    out: Option<PathBuf>,
) -> Result<(), CommandError> {
    let disciplines = store.disciplines()?;

    let file = match discipline {
        Some(id) => {
            let discipline = disciplines
                .iter()
                .find(|d| &d.id == id)
                .ok_or_else(|| CommandError::UnknownDiscipline(id.to_string()))?;
            export::export_discipline(discipline)?
        }
        None => export::export_all(&disciplines, chrono::Local::now().date_naive())?,
    };

    let path = out.unwrap_or_else(|| PathBuf::from(&file.filename));
    tokio::fs::write(&path, file.content.as_bytes())
        .await
        .map_err(|e| CommandError::file(&path, e))?;

    info!(path = %path.display(), "Export written");
    Ok(())
}
