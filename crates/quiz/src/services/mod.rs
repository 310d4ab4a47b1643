//! Business logic services for the quiz site.
//!
//! # Services
//!
//! - `auth` - Discipline unlock, student registration and login

pub mod auth;

pub use auth::{AuthError, AuthService, Registration};
