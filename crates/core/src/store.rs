//! Persistent store for disciplines and users.
//!
//! Two layers:
//!
//! - [`KeyValueStore`] moves raw bytes under string keys. [`FileStore`] keeps
//!   one `<key>.json` file per key; [`MemoryStore`] backs tests.
//! - [`JsonStore`] owns the typed collections on top of a backend. Every
//!   mutation is a whole-value replacement, and [`JsonStore::update_disciplines`]
//!   / [`JsonStore::update_users`] serialize read-modify-write cycles behind a
//!   mutex plus the backend's lock file, so the quiz site, the admin panel and
//!   the CLI can share one data directory.
//!
//! A value that fails to deserialize reads as the empty collection and logs a
//! warning; the next write replaces it.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::{Discipline, User};

/// Key holding the discipline collection.
pub const DISCIPLINES_KEY: &str = "quiz_disciplines";

/// Key holding the user collection.
pub const USERS_KEY: &str = "quiz_users";

/// Lock file guarding writers across processes.
pub const LOCK_FILE: &str = ".lock";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Byte-level storage keyed by name.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` when it was never written.
    ///
    /// # Errors
    ///
    /// Backend I/O failures.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Backend I/O failures.
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Open the file other processes lock before writing, if the backend is
    /// shared with them.
    ///
    /// # Errors
    ///
    /// The lock file cannot be created.
    fn lock_file(&self) -> StoreResult<Option<File>> {
        Ok(None)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn lock_file(&self) -> StoreResult<Option<File>> {
        (**self).lock_file()
    }
}

// =============================================================================
// Backends
// =============================================================================

/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}

/// Backend writing `<dir>/<key>.json`.
///
/// Writes go to a uniquely named temp file in the same directory and are
/// renamed into place, so a reader never sees a half-written value. Writers
/// in other processes coordinate through `<dir>/.lock`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::file_io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::file_io(&self.dir, e))?;

        let path = self.path(key);
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{key}."))
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| StoreError::file_io(&self.dir, e))?;
        temp.write_all(value)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| StoreError::file_io(temp.path(), e))?;
        temp.persist(&path)
            .map_err(|e| StoreError::file_io(&path, e.error))?;
        Ok(())
    }

    fn lock_file(&self) -> StoreResult<Option<File>> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::file_io(&self.dir, e))?;

        let path = self.dir.join(LOCK_FILE);
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map(Some)
            .map_err(|e| StoreError::file_io(path, e))
    }
}

// =============================================================================
// Typed store
// =============================================================================

/// Typed access to the discipline and user collections.
pub struct JsonStore<S = Box<dyn KeyValueStore>> {
    backend: S,
    write_lock: Mutex<()>,
}

impl<S> std::fmt::Debug for JsonStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore").finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> JsonStore<S> {
    pub const fn new(backend: S) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// All disciplines, in insertion order.
    ///
    /// # Errors
    ///
    /// Backend I/O failures. Corrupt data is not an error.
    pub fn disciplines(&self) -> StoreResult<Vec<Discipline>> {
        self.read(DISCIPLINES_KEY)
    }

    /// All registered users.
    ///
    /// # Errors
    ///
    /// Backend I/O failures. Corrupt data is not an error.
    pub fn users(&self) -> StoreResult<Vec<User>> {
        self.read(USERS_KEY)
    }

    /// Whether the discipline key has ever been written.
    ///
    /// # Errors
    ///
    /// Backend I/O failures.
    pub fn has_disciplines(&self) -> StoreResult<bool> {
        Ok(self.backend.get(DISCIPLINES_KEY)?.is_some())
    }

    /// Whether the user key has ever been written.
    ///
    /// # Errors
    ///
    /// Backend I/O failures.
    pub fn has_users(&self) -> StoreResult<bool> {
        Ok(self.backend.get(USERS_KEY)?.is_some())
    }

    /// Overwrite the discipline collection.
    ///
    /// # Errors
    ///
    /// Serialization or backend I/O failures.
    pub fn replace_disciplines(&self, disciplines: &[Discipline]) -> StoreResult<()> {
        self.exclusive(|| self.write(DISCIPLINES_KEY, disciplines))
    }

    /// Overwrite the user collection.
    ///
    /// # Errors
    ///
    /// Serialization or backend I/O failures.
    pub fn replace_users(&self, users: &[User]) -> StoreResult<()> {
        self.exclusive(|| self.write(USERS_KEY, users))
    }

    /// Write `disciplines` only when the key has never been written.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Serialization or backend I/O failures.
    pub fn insert_disciplines_if_absent(&self, disciplines: &[Discipline]) -> StoreResult<bool> {
        self.exclusive(|| self.write_if_absent(DISCIPLINES_KEY, disciplines))
    }

    /// Write `users` only when the key has never been written.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Serialization or backend I/O failures.
    pub fn insert_users_if_absent(&self, users: &[User]) -> StoreResult<bool> {
        self.exclusive(|| self.write_if_absent(USERS_KEY, users))
    }

    /// Run `f` against the current disciplines and store what it returns.
    ///
    /// Nothing is written when `f` fails.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or a [`StoreError`] converted into `E`.
    pub fn update_disciplines<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&[Discipline]) -> Result<(Vec<Discipline>, T), E>,
        E: From<StoreError>,
    {
        self.update(DISCIPLINES_KEY, f)
    }

    /// Run `f` against the current users and store what it returns.
    ///
    /// Nothing is written when `f` fails.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or a [`StoreError`] converted into `E`.
    pub fn update_users<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&[User]) -> Result<(Vec<User>, T), E>,
        E: From<StoreError>,
    {
        self.update(USERS_KEY, f)
    }

    fn update<V, T, E, F>(&self, key: &str, f: F) -> Result<T, E>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce(&[V]) -> Result<(Vec<V>, T), E>,
        E: From<StoreError>,
    {
        self.exclusive(|| {
            let current: Vec<V> = self.read(key)?;
            let (next, output) = f(&current)?;
            self.write(key, &next)?;
            Ok(output)
        })
    }

    /// Run `f` holding the in-process mutex and, when the backend has one,
    /// an exclusive lock on its lock file.
    fn exclusive<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lock = self.backend.lock_file()?.map(fd_lock::RwLock::new);
        let _file_guard = lock
            .as_mut()
            .map(fd_lock::RwLock::write)
            .transpose()
            .map_err(|e| StoreError::file_io(LOCK_FILE, e))?;
        f()
    }

    fn write_if_absent<V: Serialize>(&self, key: &str, values: &[V]) -> StoreResult<bool> {
        if self.backend.get(key)?.is_some() {
            return Ok(false);
        }
        self.write(key, values)?;
        Ok(true)
    }

    fn read<V: DeserializeOwned>(&self, key: &str) -> StoreResult<Vec<V>> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(values) => Ok(values),
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored value is not valid JSON, using empty default");
                Ok(Vec::new())
            }
        }
    }

    fn write<V: Serialize>(&self, key: &str, values: &[V]) -> StoreResult<()> {
        let bytes = serde_json::to_vec(values)?;
        self.backend.set(key, &bytes)
    }
}
