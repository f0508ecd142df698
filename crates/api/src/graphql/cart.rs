//! Cart resolvers. Every operation acts on the caller's own cart.

use async_graphql::{Context, ID, Object, Result};

use crate::error::AppError;
use crate::models::Cart;
use crate::services::CartService;
use crate::services::cart::DEFAULT_ADD_QUANTITY;

use super::{arg_id, caller, store};

#[derive(Default)]
pub struct CartQuery;

#[Object]
impl CartQuery {
    async fn my_cart(&self, ctx: &Context<'_>) -> Result<Cart> {
        CartService::new(store(ctx)?)
            .my_cart(caller(ctx))
            .await
            .map_err(AppError::into_graphql)
    }
}

#[derive(Default)]
pub struct CartMutation;

#[Object]
impl CartMutation {
    /// Adds one unit unless `quantity` says otherwise.
    async fn add_to_cart(
        &self,
        ctx: &Context<'_>,
        product_id: ID,
        quantity: Option<i32>,
    ) -> Result<Cart> {
        let quantity = quantity.unwrap_or(DEFAULT_ADD_QUANTITY);
        CartService::new(store(ctx)?)
            .add_to_cart(caller(ctx), arg_id(&product_id, "productId")?, quantity)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn remove_from_cart(&self, ctx: &Context<'_>, product_id: ID) -> Result<Cart> {
        CartService::new(store(ctx)?)
            .remove_from_cart(caller(ctx), arg_id(&product_id, "productId")?)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn update_cart_item(
        &self,
        ctx: &Context<'_>,
        product_id: ID,
        quantity: i32,
    ) -> Result<Cart> {
        CartService::new(store(ctx)?)
            .update_cart_item(caller(ctx), arg_id(&product_id, "productId")?, quantity)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn clear_cart(&self, ctx: &Context<'_>) -> Result<bool> {
        CartService::new(store(ctx)?)
            .clear_cart(caller(ctx))
            .await
            .map_err(AppError::into_graphql)
    }
}
