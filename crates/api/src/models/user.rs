//! User domain types.

use chrono::{DateTime, Utc};

use craftcart_core::{Email, Principal, Role, UserId};

/// A marketplace account.
///
/// Never carries the password hash; credentials are only read through
/// [`crate::db::Store::user_credentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The claims a session token for this user carries.
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: self.email.as_str().to_owned(),
            role: self.role,
        }
    }
}

/// Data required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub profile_image: Option<String>,
}
