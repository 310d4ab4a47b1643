//! Types the admin panel keeps in the session or sends to the browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lechare_core::{Discipline, DisciplineId};

/// Session-stored admin identity.
///
/// There is a single shared admin password, so all we remember is when the
/// login happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub logged_in_at: DateTime<Utc>,
}

impl CurrentAdmin {
    #[must_use]
    pub fn now() -> Self {
        Self {
            logged_in_at: Utc::now(),
        }
    }
}

/// Discipline as listed in the panel. Admins do see the access password.
#[derive(Debug, Clone, Serialize)]
pub struct AdminDiscipline {
    pub id: DisciplineId,
    pub name: String,
    pub password: String,
    pub question_count: usize,
}

impl From<&Discipline> for AdminDiscipline {
    fn from(d: &Discipline) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            password: d.password.clone(),
            question_count: d.questions.len(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
