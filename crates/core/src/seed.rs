//! First-run bootstrap from static seed files.
//!
//! Each collection is seeded only while its store key is absent, so edits made
//! after the first run are never overwritten. The two collections are seeded
//! independently: a broken `usuarios.json` does not keep the disciplines from
//! loading, and vice versa.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::store::{JsonStore, KeyValueStore, StoreError};
use crate::types::{Discipline, DisciplineId, Email, EmailError, Question, User, UserId};

/// Seed disciplines: file name, id, display name, access password.
pub const SEED_DISCIPLINES: &[(&str, &str, &str, &str)] = &[
    ("POO.json", "3", "POO", "poo"),
    ("GP.json", "4", "Gerenciamento de Projetos", "gp"),
];

pub const SEED_USERS_FILE: &str = "usuarios.json";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("seed file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("seed user '{name}' has an invalid email: {source}")]
    InvalidEmail {
        name: String,
        #[source]
        source: EmailError,
    },

    #[error("failed to hash password for seed user '{name}': {message}")]
    Hash { name: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to one collection during bootstrap.
#[derive(Debug)]
pub enum SeedStep {
    /// The key already existed.
    Skipped,
    /// The key was written with this many records.
    Seeded(usize),
    Failed(SeedError),
}

impl SeedStep {
    fn from_result(result: Result<Option<usize>, SeedError>) -> Self {
        match result {
            Ok(Some(count)) => Self::Seeded(count),
            Ok(None) => Self::Skipped,
            Err(e) => Self::Failed(e),
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for SeedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("already present"),
            Self::Seeded(count) => write!(f, "seeded {count} record(s)"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug)]
pub struct SeedReport {
    pub disciplines: SeedStep,
    pub users: SeedStep,
}

impl SeedReport {
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.disciplines.is_failed() || self.users.is_failed()
    }
}

/// Seed both collections, logging the outcome of each.
pub fn bootstrap<S, H, E>(store: &JsonStore<S>, seed_dir: &Path, hash: H) -> SeedReport
where
    S: KeyValueStore,
    H: Fn(&str) -> Result<String, E>,
    E: fmt::Display,
{
    let report = SeedReport {
        disciplines: SeedStep::from_result(seed_disciplines(store, seed_dir)),
        users: SeedStep::from_result(seed_users(store, seed_dir, hash)),
    };

    for (collection, step) in [("disciplines", &report.disciplines), ("users", &report.users)] {
        match step {
            SeedStep::Failed(e) => tracing::error!(collection, error = %e, "Seed bootstrap failed"),
            SeedStep::Seeded(count) => tracing::info!(collection, count, "Seeded collection"),
            SeedStep::Skipped => tracing::debug!(collection, "Collection already present"),
        }
    }

    report
}

/// Write the seed disciplines when none are stored yet.
///
/// Returns the number of disciplines written, `None` when skipped.
///
/// # Errors
///
/// A seed file is missing or unparsable, or the store write fails.
pub fn seed_disciplines<S: KeyValueStore>(
    store: &JsonStore<S>,
    seed_dir: &Path,
) -> Result<Option<usize>, SeedError> {
    if store.has_disciplines()? {
        return Ok(None);
    }

    let disciplines = load_seed_disciplines(seed_dir)?;
    let written = store.insert_disciplines_if_absent(&disciplines)?;
    Ok(written.then_some(disciplines.len()))
}

/// Write the seed users when none are stored yet, hashing plaintext passwords.
///
/// Passwords that already look like an Argon2 PHC string are kept as-is.
///
/// # Errors
///
/// The seed file is missing or unparsable, a user is invalid, hashing fails,
/// or the store write fails.
pub fn seed_users<S, H, E>(
    store: &JsonStore<S>,
    seed_dir: &Path,
    hash: H,
) -> Result<Option<usize>, SeedError>
where
    S: KeyValueStore,
    H: Fn(&str) -> Result<String, E>,
    E: fmt::Display,
{
    if store.has_users()? {
        return Ok(None);
    }

    let seeds: Vec<SeedUser> = read_json(&seed_dir.join(SEED_USERS_FILE))?;
    let users = seeds
        .into_iter()
        .map(|seed| seed.into_user(&hash))
        .collect::<Result<Vec<_>, _>>()?;

    let written = store.insert_users_if_absent(&users)?;
    Ok(written.then_some(users.len()))
}

/// Build the seed disciplines from their question files.
///
/// # Errors
///
/// A seed file is missing or unparsable.
pub fn load_seed_disciplines(seed_dir: &Path) -> Result<Vec<Discipline>, SeedError> {
    SEED_DISCIPLINES
        .iter()
        .map(|&(file, id, name, password)| {
            let questions: Vec<Question> = read_json(&seed_dir.join(file))?;
            Ok(Discipline {
                id: DisciplineId::new(id),
                name: name.to_owned(),
                password: password.to_owned(),
                questions,
            })
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedUser {
    #[serde(default)]
    id: Option<UserId>,
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl SeedUser {
    fn into_user<H, E>(self, hash: &H) -> Result<User, SeedError>
    where
        H: Fn(&str) -> Result<String, E>,
        E: fmt::Display,
    {
        let email = Email::parse(&self.email).map_err(|source| SeedError::InvalidEmail {
            name: self.name.clone(),
            source,
        })?;

        let password = if self.password.starts_with("$argon2") {
            self.password
        } else {
            hash(&self.password).map_err(|e| SeedError::Hash {
                name: self.name.clone(),
                message: e.to_string(),
            })?
        };

        Ok(User {
            id: self.id.unwrap_or_else(UserId::generate),
            name: self.name,
            email,
            password,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SeedError> {
    let bytes = std::fs::read(path).map_err(|source| SeedError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| SeedError::Parse {
        path: path.to_owned(),
        source,
    })
}
