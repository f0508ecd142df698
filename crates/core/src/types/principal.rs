//! The authenticated identity behind a request.

use serde::{Deserialize, Serialize};

use super::{Role, UserId};

/// Claims carried by a session token: who is calling and with what role.
///
/// A missing or invalid token yields no principal at all rather than an
/// error, so handlers see `Option<Principal>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this principal is `owner` or an administrator.
    #[must_use]
    pub fn owns_or_admin(&self, owner: UserId) -> bool {
        self.id == owner || self.is_admin()
    }
}
