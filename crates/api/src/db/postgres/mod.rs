//! `PostgreSQL` implementation of [`Store`].
//!
//! Each table has a repository borrowing the pool. [`PgStore`] owns the pool
//! and delegates to them.

mod carts;
mod catalog;
mod orders;
mod reviews;
mod users;

use async_trait::async_trait;
use sqlx::PgPool;

use craftcart_core::cart::CartLines;
use craftcart_core::{CategoryId, Email, OrderId, OrderStatus, ProductId, ReviewId, Role, UserId};

pub use carts::CartRepository;
pub use catalog::{CategoryRepository, ProductRepository};
pub use orders::{OrderRepository, PgCheckout};
pub use reviews::{AdminLogRepository, ReviewRepository};
pub use users::UserRepository;

use super::{CheckoutUnit, RepositoryError, Store};
use crate::models::{
    AdminLog, Cart, Category, CategoryPatch, NewAdminLog, NewCategory, NewProduct,
    NewReview, NewUser, Order, Product, ProductFilter, ProductPatch, Review, ReviewPatch, User,
};

/// Store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        UserRepository::new(&self.pool).create(user).await
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_id(id).await
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_email(email).await
    }

    async fn user_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        UserRepository::new(&self.pool).get_credentials(email).await
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        UserRepository::new(&self.pool).list_all().await
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).set_role(id, role).await
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        CategoryRepository::new(&self.pool).create(category).await
    }

    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        CategoryRepository::new(&self.pool).get_by_id(id).await
    }

    async fn category_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        CategoryRepository::new(&self.pool).get_by_name(name).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        CategoryRepository::new(&self.pool).list_all().await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, RepositoryError> {
        CategoryRepository::new(&self.pool).update(id, patch).await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        CategoryRepository::new(&self.pool).delete(id).await
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        ProductRepository::new(&self.pool).create(product).await
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get_by_id(id).await
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get_many(ids).await
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).list(filter).await
    }

    async fn newest_products(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).newest(limit).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).update(id, patch).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        ProductRepository::new(&self.pool).delete(id).await
    }

    async fn delete_all_products(&self) -> Result<u64, RepositoryError> {
        ProductRepository::new(&self.pool).delete_all().await
    }

    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        CartRepository::new(&self.pool).get_for_user(user_id).await
    }

    async fn save_cart(&self, user_id: UserId, lines: &CartLines) -> Result<Cart, RepositoryError> {
        CartRepository::new(&self.pool).save(user_id, lines).await
    }

    async fn begin_checkout(&self) -> Result<Box<dyn CheckoutUnit>, RepositoryError> {
        let unit = OrderRepository::new(&self.pool).begin_checkout().await?;
        Ok(Box::new(unit))
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).get_by_id(id).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).list_all().await
    }

    async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).list_for_buyer(buyer_id).await
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).set_status(id, status).await
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        ReviewRepository::new(&self.pool).create(review).await
    }

    async fn review_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        ReviewRepository::new(&self.pool).get_by_id(id).await
    }

    async fn review_for_pair(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        ReviewRepository::new(&self.pool)
            .get_for_pair(product_id, user_id)
            .await
    }

    async fn reviews_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        ReviewRepository::new(&self.pool)
            .list_for_product(product_id)
            .await
    }

    async fn reviews_for_user(&self, user_id: UserId) -> Result<Vec<Review>, RepositoryError> {
        ReviewRepository::new(&self.pool).list_for_user(user_id).await
    }

    async fn update_review(
        &self,
        id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<Option<Review>, RepositoryError> {
        ReviewRepository::new(&self.pool).update(id, patch).await
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        ReviewRepository::new(&self.pool).delete(id).await
    }

    async fn insert_admin_log(&self, entry: NewAdminLog) -> Result<AdminLog, RepositoryError> {
        AdminLogRepository::new(&self.pool).create(entry).await
    }
}
