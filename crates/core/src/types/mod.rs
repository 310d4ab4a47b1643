//! Core types for Lechare Educacional.
//!
//! This module provides the persisted records and type-safe wrappers for
//! common domain concepts.

pub mod discipline;
pub mod email;
pub mod id;
pub mod user;

pub use discipline::{Discipline, Question};
pub use email::{Email, EmailError};
pub use id::*;
pub use user::{User, UserProfile};
