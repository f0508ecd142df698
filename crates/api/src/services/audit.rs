//! Administrator audit trail.

use craftcart_core::Principal;

use crate::db::Store;
use crate::models::NewAdminLog;

/// Record an action taken by `admin`.
///
/// Best effort: a failed insert is logged and swallowed, so the mutation
/// that triggered it still succeeds.
pub async fn record(store: &dyn Store, admin: &Principal, action: String) {
    tracing::info!(admin_id = %admin.id, action = %action, "Admin action");

    if let Err(e) = store
        .insert_admin_log(NewAdminLog {
            admin_id: admin.id,
            action,
        })
        .await
    {
        tracing::warn!(admin_id = %admin.id, error = %e, "Failed to record admin action");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftcart_core::{Role, UserId};

    use super::*;
    use crate::db::MemoryStore;

    fn admin() -> Principal {
        Principal {
            id: UserId::new(1),
            email: "admin@craftcart.test".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_record_writes_entry() {
        let store = MemoryStore::new();
        record(&store, &admin(), "Deleted product: Vase (ID: 4)".to_string()).await;

        let logs = store.admin_logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].admin_id, UserId::new(1));
        assert_eq!(logs[0].action, "Deleted product: Vase (ID: 4)");
    }

    #[tokio::test]
    async fn test_record_swallows_failures() {
        let store = MemoryStore::new();
        store.set_admin_log_offline(true);
        record(&store, &admin(), "Updated product: Vase (ID: 4)".to_string()).await;
        assert!(store.admin_logs().await.is_empty());
    }
}
