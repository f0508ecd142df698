//! GraphQL output types.
//!
//! Scalar fields read straight off the domain models. Relation fields go
//! through [`crate::loaders`] and only run when selected.

use async_graphql::{Context, ID, Object, Result, SimpleObject};
use chrono::{DateTime, Utc};

use craftcart_core::{OrderStatus, Role, money};

use crate::error::AppError;
use crate::graphql::{caller, store};
use crate::loaders;
use crate::models::{Cart, Category, Order, Product, Review, User};
use crate::services::{AuthPayload, UserService};

fn id(value: impl ToString) -> ID {
    ID(value.to_string())
}

// =============================================================================
// Users
// =============================================================================

/// Public projection of an account. The password hash never leaves storage.
#[Object]
impl User {
    async fn id(&self) -> ID {
        id(self.id)
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn email(&self) -> &str {
        self.email.as_str()
    }

    async fn role(&self) -> Role {
        self.role
    }

    async fn profile_image(&self) -> Option<&str> {
        self.profile_image.as_deref()
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Products listed by this user as an artisan.
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        loaders::products_of_artisan(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }

    /// Orders placed by this user. Visible to the user and administrators.
    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        UserService::new(store(ctx)?)
            .orders_of(caller(ctx), self.id)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn reviews(&self, ctx: &Context<'_>) -> Result<Vec<Review>> {
        loaders::reviews_by(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }
}

#[Object]
impl AuthPayload {
    async fn token(&self) -> &str {
        &self.token
    }

    async fn user(&self) -> User {
        self.user.clone()
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[Object]
impl Category {
    async fn id(&self) -> ID {
        id(self.id)
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        loaders::products_in(store(ctx)?, self.id)
            .await
            .map_err(AppError::into_graphql)
    }
}

#[Object]
impl Product {
    async fn id(&self) -> ID {
        id(self.id)
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn description(&self) -> &str {
        &self.description
    }

    async fn price(&self) -> f64 {
        money::to_f64(self.price)
    }

    /// Units in stock.
    async fn quantity(&self) -> i32 {
        self.quantity
    }

    async fn images(&self) -> Vec<String> {
        self.images.clone()
    }

    /// `null` once the category has been deleted.
    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        loaders::category_of(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn artisan(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        loaders::artisan_of(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn reviews(&self, ctx: &Context<'_>) -> Result<Vec<Review>> {
        loaders::reviews_of(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// =============================================================================
// Reviews
// =============================================================================

#[Object]
impl Review {
    async fn id(&self) -> ID {
        id(self.id)
    }

    async fn rating(&self) -> i32 {
        self.rating
    }

    async fn comment(&self) -> &str {
        &self.comment
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        loaders::author_of(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        loaders::reviewed_product(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// =============================================================================
// Carts
// =============================================================================

/// One cart line. `product` is `null` when the product has been deleted.
#[derive(SimpleObject)]
pub struct CartItem {
    pub product: Option<Product>,
    pub quantity: i32,
}

#[Object]
impl Cart {
    /// `null` for a user who has never added anything.
    async fn id(&self) -> Option<ID> {
        self.id.map(id)
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        loaders::user_by_id(store(ctx)?, self.user_id)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn items(&self, ctx: &Context<'_>) -> Result<Vec<CartItem>> {
        let mut products = loaders::cart_products(store(ctx)?, &self.lines)
            .await
            .map_err(AppError::into_graphql)?;

        Ok(self
            .lines
            .as_slice()
            .iter()
            .map(|line| CartItem {
                product: products.remove(&line.product_id),
                quantity: line.quantity,
            })
            .collect())
    }

    /// Sum of line quantities.
    async fn total_items(&self) -> i32 {
        i32::try_from(self.lines.total_items()).unwrap_or(i32::MAX)
    }

    /// Sum of quantity times current price.
    async fn subtotal(&self, ctx: &Context<'_>) -> Result<f64> {
        let subtotal = loaders::cart_subtotal(store(ctx)?, &self.lines)
            .await
            .map_err(AppError::into_graphql)?;
        Ok(money::to_f64(subtotal))
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A priced order line. `product` is `null` when the product has since been
/// deleted; quantity and price are kept regardless.
#[derive(SimpleObject)]
pub struct OrderItem {
    pub product: Option<Product>,
    pub quantity: i32,
    pub price_at_purchase: f64,
}

#[Object]
impl Order {
    async fn id(&self) -> ID {
        id(self.id)
    }

    async fn buyer(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        loaders::buyer_of(store(ctx)?, self)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn items(&self, ctx: &Context<'_>) -> Result<Vec<OrderItem>> {
        let products = loaders::order_products(store(ctx)?, &self.lines)
            .await
            .map_err(AppError::into_graphql)?;

        Ok(self
            .lines
            .iter()
            .map(|line| OrderItem {
                product: products.get(&line.product_id).cloned(),
                quantity: line.quantity,
                price_at_purchase: money::to_f64(line.price_at_purchase),
            })
            .collect())
    }

    async fn total(&self) -> f64 {
        money::to_f64(self.total)
    }

    async fn status(&self) -> OrderStatus {
        self.status
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
