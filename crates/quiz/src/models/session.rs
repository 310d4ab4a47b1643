//! Session-related types.
//!
//! Nothing here is written to the store: the unlocked discipline, the
//! logged-in student and the quiz in progress live only as long as the
//! browser session.

use serde::{Deserialize, Serialize};

use lechare_core::{Email, User, UserId};

/// Session-stored student identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in student.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the discipline whose password the student entered.
    pub const UNLOCKED_DISCIPLINE: &str = "unlocked_discipline";

    /// Key for the quiz in progress, a `lechare_core::quiz::QuizSession`.
    pub const ACTIVE_QUIZ: &str = "active_quiz";
}
