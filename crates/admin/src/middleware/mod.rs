//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing with status and latency)
//! 3. Session layer (tower-sessions, in-memory, SameSite=Strict)
//! 4. Auth guard ([`RequireAdmin`] extractor on protected routes)

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, clear_current_admin, set_current_admin};
pub use session::create_session_layer;
