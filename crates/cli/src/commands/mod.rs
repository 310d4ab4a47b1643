//! CLI command implementations.

pub mod discipline;
pub mod seed;
pub mod sync;
pub mod transfer;
pub mod users;

use std::path::{Path, PathBuf};

use thiserror::Error;

use lechare_admin::config::ConfigError;
use lechare_admin::github::GitHubError;
use lechare_core::catalog::CatalogError;
use lechare_core::export::ExportError;
use lechare_core::import::ImportError;
use lechare_core::store::{FileStore, JsonStore, StoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Reading or writing a local file failed.
    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Discipline id not in the store.
    #[error("discipline {0} not found")]
    UnknownDiscipline(String),

    /// Seeding finished with failures.
    #[error("seeding failed, see the log above")]
    SeedFailed,
}

impl CommandError {
    pub fn file(path: &Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Open the file-backed store in `data_dir`.
pub fn open_store(data_dir: &Path) -> JsonStore {
    JsonStore::new(Box::new(FileStore::new(data_dir)))
}
