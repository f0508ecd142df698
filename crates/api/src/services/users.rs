//! Account queries and role management.

use tracing::instrument;

use craftcart_core::{Operation, Principal, Role, UserId};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Order, User};
use crate::services::audit;

pub struct UserService<'a> {
    store: &'a dyn Store,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// The caller's own account.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a session, `NotFound` if the account has
    /// been removed since the token was issued.
    pub async fn me(&self, caller: Option<&Principal>) -> Result<User> {
        let caller = Operation::Me.require(caller)?;
        self.store
            .user_by_id(caller.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    /// Public lookup by id.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.store.user_by_id(id).await?)
    }

    /// Every account.
    ///
    /// # Errors
    ///
    /// `Forbidden` for anyone but an administrator.
    pub async fn users(&self, caller: Option<&Principal>) -> Result<Vec<User>> {
        Operation::Users.require(caller)?;
        Ok(self.store.list_users().await?)
    }

    /// Orders placed by `user_id`, visible to that user and administrators.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `Forbidden` for anyone else.
    pub async fn orders_of(&self, caller: Option<&Principal>, user_id: UserId) -> Result<Vec<Order>> {
        let caller = Operation::UserOrders.require(caller)?;
        Operation::UserOrders.check_owner(caller, user_id)?;
        Ok(self.store.orders_for_buyer(user_id).await?)
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-administrators, `NotFound` for an unknown id.
    #[instrument(skip(self, caller), fields(user_id = %id, role = %role))]
    pub async fn update_user_role(
        &self,
        caller: Option<&Principal>,
        id: UserId,
        role: Role,
    ) -> Result<User> {
        let caller = Operation::UpdateUserRole.require(caller)?;

        let user = self
            .store
            .set_user_role(id, role)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID '{id}' not found.")))?;

        audit::record(
            self.store,
            caller,
            format!("Updated role of user {} (ID: {id}) to {role}", user.email),
        )
        .await;

        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftcart_core::Email;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewUser;

    async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> Principal {
        store
            .insert_user(NewUser {
                name: email.to_string(),
                email: Email::parse(email).unwrap(),
                password_hash: "x".to_string(),
                role,
                profile_image: None,
            })
            .await
            .unwrap()
            .principal()
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let store = MemoryStore::new();
        let users = UserService::new(&store);
        assert!(matches!(users.me(None).await, Err(AppError::Unauthenticated)));

        let buyer = seed_user(&store, "buyer@craftcart.test", Role::Buyer).await;
        assert_eq!(users.me(Some(&buyer)).await.unwrap().id, buyer.id);
    }

    #[tokio::test]
    async fn test_users_is_admin_only() {
        let store = MemoryStore::new();
        let buyer = seed_user(&store, "buyer@craftcart.test", Role::Buyer).await;
        let admin = seed_user(&store, "admin@craftcart.test", Role::Admin).await;
        let users = UserService::new(&store);

        assert!(matches!(users.users(Some(&buyer)).await, Err(AppError::Forbidden)));
        assert_eq!(users.users(Some(&admin)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_orders_visible_to_self_and_admin_only() {
        let store = MemoryStore::new();
        let buyer = seed_user(&store, "buyer@craftcart.test", Role::Buyer).await;
        let other = seed_user(&store, "other@craftcart.test", Role::Buyer).await;
        let admin = seed_user(&store, "admin@craftcart.test", Role::Admin).await;
        let users = UserService::new(&store);

        assert!(users.orders_of(Some(&buyer), buyer.id).await.is_ok());
        assert!(users.orders_of(Some(&admin), buyer.id).await.is_ok());
        assert!(matches!(
            users.orders_of(Some(&other), buyer.id).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_update_user_role_is_audited() {
        let store = MemoryStore::new();
        let buyer = seed_user(&store, "maker@craftcart.test", Role::Buyer).await;
        let admin = seed_user(&store, "admin@craftcart.test", Role::Admin).await;
        let users = UserService::new(&store);

        let updated = users
            .update_user_role(Some(&admin), buyer.id, Role::Artisan)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Artisan);

        let logs = store.admin_logs().await;
        assert_eq!(logs.len(), 1);
        assert!(logs[0].action.contains("to ARTISAN"));

        assert!(matches!(
            users
                .update_user_role(Some(&admin), UserId::new(999), Role::Artisan)
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
