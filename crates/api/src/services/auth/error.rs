//! Authentication error types.

use thiserror::Error;

use craftcart_core::validation::FieldError;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown email. The two are never distinguished.
    #[error("Invalid credentials. Please check your email and password.")]
    InvalidCredentials,

    /// Email already registered.
    #[error("A user with this email address already exists.")]
    UserAlreadyExists,

    /// Registration input failed validation.
    #[error("invalid registration input")]
    Validation(Vec<FieldError>),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session token could not be signed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
