//! Unified error handling with Sentry integration.
//!
//! Every service returns [`AppError`]. GraphQL resolvers turn it into an
//! error entry with an `extensions.code` via [`AppError::into_graphql`]; plain
//! HTTP handlers return it directly through [`IntoResponse`]. Server faults
//! are captured to Sentry on the way out and never shown to the caller.

use async_graphql::ErrorExtensions;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use craftcart_core::AccessError;
use craftcart_core::cart::CartError;
use craftcart_core::order::RequestError;
use craftcart_core::validation::FieldError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// No principal, or the token was rejected.
    #[error("You must be logged in to perform this action.")]
    Unauthenticated,

    /// Login failed. Deliberately says nothing about which part was wrong.
    #[error("Invalid credentials. Please check your email and password.")]
    InvalidCredentials,

    /// The principal lacks the role or ownership required.
    #[error("You are not authorized to perform this action.")]
    Forbidden,

    /// Input failed validation; `fields` lists every violation.
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// Malformed or otherwise unacceptable input.
    #[error("{0}")]
    BadRequest(String),

    /// Checkout asked for more units than are in stock.
    #[error("Not enough stock for {product}. Only {available} available.")]
    InsufficientStock { product: String, available: i32 },

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Entity is missing or belongs to someone else; the caller cannot tell which.
    #[error("{0}")]
    NotFoundOrForbidden(String),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure with a summary message.
    pub fn validation(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Machine-readable code placed in GraphQL `extensions.code`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation { .. } | Self::BadRequest(_) | Self::InsufficientStock { .. } => {
                "BAD_USER_INPUT"
            }
            Self::NotFound(_) | Self::NotFoundOrForbidden(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) | Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status for plain endpoints.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation { .. } | Self::BadRequest(_) | Self::InsufficientStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) | Self::NotFoundOrForbidden(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// Message safe to show the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Send server faults to Sentry and the log.
    fn capture(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }

    /// Convert into a GraphQL error, capturing server faults first.
    #[must_use]
    pub fn into_graphql(self) -> async_graphql::Error {
        self.capture();
        self.extend()
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.public_message()).extend_with(|_, ext| {
            ext.set("code", self.code());
            if let Self::Validation { fields, .. } = self
                && let Ok(value) = async_graphql::to_value(fields)
            {
                ext.set("validationErrors", value);
            }
        })
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(what) => Self::Conflict(what),
            RepositoryError::NotFound => Self::NotFound("Not found.".to_string()),
            other => Self::Database(other),
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => Self::Unauthenticated,
            AccessError::Forbidden => Self::Forbidden,
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::QuantityBelowOne => Self::BadRequest(err.to_string()),
            CartError::LineNotFound(_) => Self::NotFound(err.to_string()),
        }
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::UserAlreadyExists => Self::Conflict(err.to_string()),
            AuthError::Validation(fields) => {
                Self::validation("Failed to register due to validation errors.", fields)
            }
            AuthError::Repository(e) => e.into(),
            AuthError::PasswordHash | AuthError::Token(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.capture();
        let status = self.status();
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
