//! Discipline management commands.

use tracing::info;

use lechare_core::catalog;
use lechare_core::store::JsonStore;
use lechare_core::DisciplineId;

use super::CommandError;

/// Log every discipline with its question count.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list(store: &JsonStore) -> Result<(), CommandError> {
    let disciplines = store.disciplines()?;

    info!("Disciplines ({})", disciplines.len());
    for d in &disciplines {
        info!("  {}  {}  ({} questions)", d.id, d.name, d.questions.len());
    }
    Ok(())
}

/// Create an empty discipline.
///
/// # Errors
///
/// Returns an error for a blank or duplicate name.
pub fn add(store: &JsonStore, name: &str, password: &str) -> Result<(), CommandError> {
    let created = store.update_disciplines(|list| {
        catalog::add_discipline(list, name, password).map_err(CommandError::from)
    })?;

    info!(id = %created.id, "Created discipline {}", created.name);
    Ok(())
}

/// Rename a discipline. The password is kept unless a new one is given.
///
/// # Errors
///
/// Returns an error for an unknown id or a duplicate name.
pub fn rename(
    store: &JsonStore,
    id: &DisciplineId,
    name: &str,
    password: Option<&str>,
) -> Result<(), CommandError> {
    let updated = store.update_disciplines(|list| {
        let current = list
            .iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| CommandError::UnknownDiscipline(id.to_string()))?;
        let password = password.unwrap_or(&current.password).to_owned();
        catalog::update_discipline(list, id, name, &password).map_err(CommandError::from)
    })?;

    info!(id = %updated.id, "Discipline is now named {}", updated.name);
    Ok(())
}

/// Delete a discipline and its questions.
///
/// # Errors
///
/// Returns an error for an unknown id.
pub fn remove(store: &JsonStore, id: &DisciplineId) -> Result<(), CommandError> {
    let removed = store.update_disciplines(|list| {
        catalog::remove_discipline(list, id).map_err(CommandError::from)
    })?;

    info!(
        "Removed discipline {} and its {} questions",
        removed.name,
        removed.questions.len()
    );
    Ok(())
}
