//! Registered students.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// A registered student as persisted in the store.
///
/// `password` holds an Argon2id PHC string. Seed files may still carry a
/// plaintext value until bootstrap hashes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The user without its password hash, safe to hand to clients.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public view of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_user_uses_camel_case() {
        let user: User = serde_json::from_str(
            r#"{"id":"1","name":"Ana","email":"ana@x.com","password":"123","createdAt":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.created_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");

        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
    }
}
