//! Disciplines and their questions.

use serde::{Deserialize, Serialize};

use super::id::DisciplineId;

/// A subject owning a shared access password and an ordered question set.
///
/// Serialized with the field names the browser client and the seed files use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: DisciplineId,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Discipline {
    /// Create an empty discipline with a freshly generated ID.
    #[must_use]
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: DisciplineId::generate(),
            name: name.into(),
            password: password.into(),
            questions: Vec::new(),
        }
    }

    /// Case-insensitive name comparison used for uniqueness and CSV routing.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Whether `password` unlocks this discipline.
    #[must_use]
    pub fn accepts_password(&self, password: &str) -> bool {
        self.password == password
    }
}

/// One quiz item.
///
/// Seed files may omit `comment`; it then reads as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "number_as_string")]
    pub number: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub comment: String,
}

impl Question {
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            question: question.into(),
            answer: answer.into(),
            comment: comment.into(),
        }
    }

    /// Whether the comment has anything worth revealing.
    #[must_use]
    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }
}

/// Seed files written by hand sometimes carry `"number": 12` instead of `"12"`.
fn number_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
