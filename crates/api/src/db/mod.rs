//! Storage seam for the marketplace.
//!
//! Services talk to storage only through the [`Store`] trait, so the same
//! business logic runs against PostgreSQL in production and against
//! [`MemoryStore`] in tests.
//!
//! # Tables (`PostgreSQL`)
//!
//! - `users` - Accounts with argon2 password hashes
//! - `categories` - Product categories (unique names)
//! - `products` - Listings, with a GIN full-text index over name + description
//! - `carts` / `cart_items` - One cart per user
//! - `orders` / `order_items` - Placed orders with price snapshots
//! - `reviews` - Unique per (product, user)
//! - `admin_logs` - Administrator audit trail
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p craftcart-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use craftcart_core::cart::CartLines;
use craftcart_core::{CategoryId, Email, OrderId, OrderStatus, ProductId, ReviewId, Role, UserId};

use crate::models::{
    AdminLog, Cart, Category, CategoryPatch, NewAdminLog, NewCategory, NewOrder, NewProduct,
    NewReview, NewUser, Order, Product, ProductFilter, ProductPatch, Review, ReviewPatch, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Document-style access to every marketplace collection.
///
/// Lookups return `Ok(None)` (or `false` for deletes) when the entity does
/// not exist; `Err` is reserved for storage failures and constraint
/// violations.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Insert a user. `Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;
    /// A user together with their password hash, for login only.
    async fn user_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
    async fn set_user_role(&self, id: UserId, role: Role) -> Result<Option<User>, RepositoryError>;

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Insert a category. `Conflict` when the name is taken.
    async fn insert_category(&self, category: NewCategory) -> Result<Category, RepositoryError>;
    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;
    async fn category_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError>;
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;
    /// Update a category. `Conflict` when the new name is taken.
    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, RepositoryError>;
    /// Delete a category. Products referencing it are left untouched.
    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError>;

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError>;
    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    /// Products for the given ids, in no particular order. Missing ids are skipped.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;
    /// Every product matching `filter`, in id order.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError>;
    /// The `limit` most recently created products, newest first.
    async fn newest_products(&self, limit: i64) -> Result<Vec<Product>, RepositoryError>;
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError>;
    /// Hard delete. Orders, carts and reviews keep their references.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;
    /// Remove every product, returning how many were deleted.
    async fn delete_all_products(&self) -> Result<u64, RepositoryError>;

    // -------------------------------------------------------------------------
    // Carts
    // -------------------------------------------------------------------------

    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;
    /// Create or replace the user's cart lines.
    async fn save_cart(&self, user_id: UserId, lines: &CartLines) -> Result<Cart, RepositoryError>;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Open a checkout unit of work.
    ///
    /// Other calls on the same store may wait until the unit is committed
    /// or dropped.
    async fn begin_checkout(&self) -> Result<Box<dyn CheckoutUnit>, RepositoryError>;
    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;
    async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, RepositoryError>;
    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;

    // -------------------------------------------------------------------------
    // Reviews
    // -------------------------------------------------------------------------

    /// Insert a review. `Conflict` when the user already reviewed the product.
    async fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError>;
    async fn review_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError>;
    async fn review_for_pair(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<Option<Review>, RepositoryError>;
    async fn reviews_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError>;
    async fn reviews_for_user(&self, user_id: UserId) -> Result<Vec<Review>, RepositoryError>;
    async fn update_review(
        &self,
        id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<Option<Review>, RepositoryError>;
    async fn delete_review(&self, id: ReviewId) -> Result<bool, RepositoryError>;

    // -------------------------------------------------------------------------
    // Admin audit log
    // -------------------------------------------------------------------------

    async fn insert_admin_log(&self, entry: NewAdminLog) -> Result<AdminLog, RepositoryError>;
}

/// Staged stock changes and order insert for one checkout.
///
/// Nothing becomes visible until [`commit`](Self::commit). Dropping the unit
/// discards every staged change.
#[async_trait]
pub trait CheckoutUnit: Send {
    /// Load products and hold them against concurrent checkouts, locking
    /// in the order `ids` are given.
    ///
    /// Unknown ids are missing from the map. Quantities are as staged by
    /// this unit.
    async fn lock_products(
        &mut self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError>;

    async fn set_product_quantity(
        &mut self,
        id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError>;

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}
