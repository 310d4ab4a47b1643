//! Authentication service.
//!
//! Two independent gates guard the quiz: the discipline's shared access
//! password, and a student account (email + password).

mod error;

pub use error::AuthError;

use chrono::Utc;
use serde::Deserialize;

use lechare_core::password::{hash_password, verify_password};
use lechare_core::store::JsonStore;
use lechare_core::{Discipline, DisciplineId, Email, User, UserId};

/// Registration form data.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a JsonStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Discipline Access
    // =========================================================================

    /// Check a discipline's access password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DisciplineNotFound` for an unknown id and
    /// `AuthError::IncorrectDisciplinePassword` when the password differs.
    pub fn unlock_discipline(
        &self,
        id: &DisciplineId,
        password: &str,
    ) -> Result<Discipline, AuthError> {
        let discipline = self
            .store
            .disciplines()?
            .into_iter()
            .find(|d| &d.id == id)
            .ok_or(AuthError::DisciplineNotFound)?;

        if !discipline.accepts_password(password) {
            return Err(AuthError::IncorrectDisciplinePassword);
        }

        Ok(discipline)
    }

    // =========================================================================
    // Student Accounts
    // =========================================================================

    /// Register a new student.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if name, email or password is blank.
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub fn register(&self, form: &Registration) -> Result<User, AuthError> {
        let name = form.name.trim();
        if name.is_empty() || form.email.trim().is_empty() || form.password.trim().is_empty() {
            return Err(AuthError::MissingFields);
        }
        if form.password != form.password_confirm {
            return Err(AuthError::PasswordMismatch);
        }
        let email = Email::parse(&form.email)?;

        // Hash before taking the store lock.
        let password_hash = hash_password(&form.password).map_err(|_| AuthError::PasswordHash)?;

        self.store.update_users(|users| {
            if users.iter().any(|u| u.email.same_address(email.as_str())) {
                return Err(AuthError::UserAlreadyExists);
            }

            let user = User {
                id: UserId::generate(),
                name: name.to_owned(),
                email,
                password: password_hash,
                created_at: Utc::now(),
            };

            let mut updated = users.to_vec();
            updated.push(user.clone());
            Ok((updated, user))
        })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .users()?
            .into_iter()
            .find(|u| u.email.same_address(email))
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password).map_err(|_| AuthError::InvalidCredentials)?;

        Ok(user)
    }
}
