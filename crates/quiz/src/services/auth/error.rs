//! Authentication error types.

use thiserror::Error;

use lechare_core::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] lechare_core::EmailError),

    /// A required registration field is blank.
    #[error("name, email and password are required")]
    MissingFields,

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Discipline not found.
    #[error("discipline not found")]
    DisciplineNotFound,

    /// Wrong discipline access password.
    #[error("incorrect discipline password")]
    IncorrectDisciplinePassword,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
