//! Authentication service.
//!
//! Password registration and login. Both hand back a signed session token
//! together with the public user projection.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use craftcart_core::validation::{RegistrationDraft, validate_registration};
use craftcart_core::{Email, Role};

use crate::db::{RepositoryError, Store};
use crate::models::{NewUser, User};
use crate::services::token::TokenService;

/// Registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub profile_image: Option<String>,
}

/// A fresh session: the signed token and who it belongs to.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new account.
    ///
    /// The role defaults to `BUYER`; any of the three roles may be requested.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every bad field.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip_all)]
    pub async fn register(&self, registration: Registration) -> Result<AuthPayload, AuthError> {
        let draft = RegistrationDraft {
            name: &registration.name,
            email: &registration.email,
            password: &registration.password,
            profile_image: registration.profile_image.as_deref(),
        };
        let email = validate_registration(&draft).map_err(AuthError::Validation)?;

        if self.store.user_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .store
            .insert_user(NewUser {
                name: registration.name.trim().to_owned(),
                email,
                password_hash,
                role: registration.role.unwrap_or_default(),
                profile_image: registration.profile_image,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.session_for(user)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email, a
    /// malformed email, or a wrong password alike.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .store
            .user_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        tracing::info!(user_id = %user.id, "User logged in");
        self.session_for(user)
    }

    fn session_for(&self, user: User) -> Result<AuthPayload, AuthError> {
        let token = self.tokens.issue(&user.principal())?;
        Ok(AuthPayload { token, user })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hash a password with argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
