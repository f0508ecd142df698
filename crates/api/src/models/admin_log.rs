//! Administrator audit records.

use chrono::{DateTime, Utc};

use craftcart_core::{AdminLogId, UserId};

/// One recorded administrator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminLog {
    pub id: AdminLogId,
    pub admin_id: UserId,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdminLog {
    pub admin_id: UserId,
    pub action: String,
}
