//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;

use lechare_core::password::{PasswordError, hash_password, verify_password};
use lechare_core::store::JsonStore;

use crate::config::AdminConfig;
use crate::github::{GitHubClient, GitHubError};

/// Errors building the application state at startup.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to hash admin password: {0}")]
    Password(#[from] PasswordError),

    #[error("failed to create GitHub client: {0}")]
    GitHub(#[from] GitHubError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: JsonStore,
    github: Option<GitHubClient>,
    /// Argon2 hash of `ADMIN_PASSWORD`, so logins compare in constant time.
    admin_password_hash: String,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the admin password cannot be hashed or the
    /// GitHub client cannot be built.
    pub fn new(config: AdminConfig, store: JsonStore) -> Result<Self, StateError> {
        let admin_password_hash = hash_password(config.admin_password.expose_secret())?;
        let github = config.github().map(GitHubClient::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                github,
                admin_password_hash,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the discipline and user store.
    #[must_use]
    pub fn store(&self) -> &JsonStore {
        &self.inner.store
    }

    /// GitHub client, if sync is configured.
    #[must_use]
    pub fn github(&self) -> Option<&GitHubClient> {
        self.inner.github.as_ref()
    }

    /// Check a login attempt against the admin password.
    #[must_use]
    pub fn check_admin_password(&self, password: &str) -> bool {
        verify_password(password, &self.inner.admin_password_hash).is_ok()
    }
}
