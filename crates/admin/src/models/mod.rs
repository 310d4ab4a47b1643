//! Session and view models for admin.

pub mod session;

pub use session::{AdminDiscipline, CurrentAdmin, keys};
