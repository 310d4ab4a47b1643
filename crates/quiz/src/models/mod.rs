//! Types the quiz site keeps in the HTTP session.

pub mod session;

pub use session::{CurrentUser, keys};
