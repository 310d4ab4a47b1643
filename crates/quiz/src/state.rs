//! Application state shared across handlers.

use std::sync::Arc;

use lechare_core::store::JsonStore;

use crate::config::QuizConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: QuizConfig,
    store: JsonStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: QuizConfig, store: JsonStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the quiz configuration.
    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.inner.config
    }

    /// Get a reference to the discipline and user store.
    #[must_use]
    pub fn store(&self) -> &JsonStore {
        &self.inner.store
    }
}
