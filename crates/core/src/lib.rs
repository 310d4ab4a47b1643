//! Lechare Core - Shared domain library.
//!
//! This crate provides everything the Lechare components share:
//! - `quiz` - Public quiz site (discipline unlock, student accounts, quiz navigation)
//! - `admin` - Administration panel (disciplines, users, CSV, GitHub sync)
//! - `cli` - Command-line tools for seeding, import/export and sync
//!
//! # Architecture
//!
//! No HTTP here. Domain operations are plain functions over borrowed
//! collections that return new collections; the only I/O is the [`store`]
//! backend and the [`seed`] file loader. The async session store both web
//! servers share sits behind the `sessions` feature.
//!
//! # Modules
//!
//! - [`types`] - Disciplines, questions, users, emails and newtype IDs
//! - [`quiz`] - Per-student quiz session state machine
//! - [`import`] - CSV import pipeline (global append, per-discipline replace)
//! - [`export`] - CSV export
//! - [`catalog`] - Discipline add / edit / remove
//! - [`password`] - Argon2id password hashing
//! - [`store`] - Persistent key-value store and typed JSON layer
//! - [`seed`] - First-run bootstrap from seed files
//! - `sessions` - Idle-evicting HTTP session store (feature `sessions`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod export;
pub mod import;
pub mod password;
pub mod quiz;
pub mod seed;
#[cfg(feature = "sessions")]
pub mod sessions;
pub mod store;
pub mod types;

pub use types::*;
