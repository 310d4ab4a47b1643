//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. Sessions do not survive a
//! restart; students simply unlock and log in again.

use std::time::Duration;

use lechare_core::sessions::CachedSessionStore;
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::QuizConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lechare_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over an in-memory store that evicts idle sessions.
#[must_use]
pub fn create_session_layer(config: &QuizConfig) -> SessionManagerLayer<CachedSessionStore> {
    let idle = Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs());
    let store = CachedSessionStore::new(idle);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
