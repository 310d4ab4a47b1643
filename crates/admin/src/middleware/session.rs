//! Session middleware configuration for admin.
//!
//! In-memory sessions with stricter settings than the quiz site
//! (SameSite=Strict, 24hr expiry).

use std::time::Duration;

use lechare_core::sessions::CachedSessionStore;
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "lechare_admin_session";

/// Session expiry time in seconds (24 hours - stricter than the quiz site).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over an in-memory store that evicts idle sessions.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<CachedSessionStore> {
    let idle = Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs());
    let store = CachedSessionStore::new(idle);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        // SameSite=Strict for admin (stricter than the quiz site's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
