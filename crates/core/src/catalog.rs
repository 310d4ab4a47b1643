//! Discipline catalog edits.
//!
//! Each operation takes the current list and returns a new one, leaving the
//! input untouched. Callers run them inside
//! [`JsonStore::update_disciplines`](crate::store::JsonStore::update_disciplines).

use thiserror::Error;

use crate::types::{Discipline, DisciplineId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("discipline name and password are required")]
    Blank,

    #[error("a discipline named '{0}' already exists")]
    DuplicateName(String),

    #[error("discipline {0} not found")]
    NotFound(DisciplineId),
}

fn validate(name: &str, password: &str) -> Result<(String, String), CatalogError> {
    let (name, password) = (name.trim(), password.trim());
    if name.is_empty() || password.is_empty() {
        return Err(CatalogError::Blank);
    }
    Ok((name.to_owned(), password.to_owned()))
}

/// Append a new, empty discipline.
///
/// # Errors
///
/// [`CatalogError::Blank`] or [`CatalogError::DuplicateName`].
pub fn add_discipline(
    disciplines: &[Discipline],
    name: &str,
    password: &str,
) -> Result<(Vec<Discipline>, Discipline), CatalogError> {
    let (name, password) = validate(name, password)?;
    if disciplines.iter().any(|d| d.has_name(&name)) {
        return Err(CatalogError::DuplicateName(name));
    }

    let created = Discipline::new(name, password);
    let mut updated = disciplines.to_vec();
    updated.push(created.clone());
    Ok((updated, created))
}

/// Rename a discipline and/or change its password. Questions are kept.
///
/// # Errors
///
/// [`CatalogError::Blank`], [`CatalogError::NotFound`] or
/// [`CatalogError::DuplicateName`] when another discipline has the name.
pub fn update_discipline(
    disciplines: &[Discipline],
    id: &DisciplineId,
    name: &str,
    password: &str,
) -> Result<(Vec<Discipline>, Discipline), CatalogError> {
    let (name, password) = validate(name, password)?;
    if !disciplines.iter().any(|d| &d.id == id) {
        return Err(CatalogError::NotFound(id.clone()));
    }
    if disciplines.iter().any(|d| &d.id != id && d.has_name(&name)) {
        return Err(CatalogError::DuplicateName(name));
    }

    let mut updated = disciplines.to_vec();
    let mut edited = None;
    for discipline in &mut updated {
        if &discipline.id == id {
            discipline.name.clone_from(&name);
            discipline.password.clone_from(&password);
            edited = Some(discipline.clone());
        }
    }

    edited
        .map(|d| (updated, d))
        .ok_or_else(|| CatalogError::NotFound(id.clone()))
}

/// Delete a discipline and its questions.
///
/// # Errors
///
/// [`CatalogError::NotFound`] when `id` is unknown.
pub fn remove_discipline(
    disciplines: &[Discipline],
    id: &DisciplineId,
) -> Result<(Vec<Discipline>, Discipline), CatalogError> {
    let removed = disciplines
        .iter()
        .find(|d| &d.id == id)
        .cloned()
        .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

    let updated = disciplines
        .iter()
        .filter(|d| &d.id != id)
        .cloned()
        .collect();
    Ok((updated, removed))
}
