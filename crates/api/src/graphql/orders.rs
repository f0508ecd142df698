//! Order resolvers.

use async_graphql::{Context, ID, Object, Result};

use craftcart_core::OrderStatus;
use craftcart_core::order::RequestedLine;

use crate::error::AppError;
use crate::models::Order;
use crate::services::OrderService;

use super::inputs::OrderItemInput;
use super::{arg_id, caller, store};

#[derive(Default)]
pub struct OrderQuery;

#[Object]
impl OrderQuery {
    /// Every order. Administrators only.
    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        OrderService::new(store(ctx)?)
            .orders(caller(ctx))
            .await
            .map_err(AppError::into_graphql)
    }

    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Order> {
        OrderService::new(store(ctx)?)
            .order(caller(ctx), arg_id(&id, "id")?)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn my_orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        OrderService::new(store(ctx)?)
            .my_orders(caller(ctx))
            .await
            .map_err(AppError::into_graphql)
    }
}

#[derive(Default)]
pub struct OrderMutation;

#[Object]
impl OrderMutation {
    /// Place an order. Either every line is fulfilled or nothing changes.
    async fn create_order(&self, ctx: &Context<'_>, items: Vec<OrderItemInput>) -> Result<Order> {
        let items = items
            .into_iter()
            .map(RequestedLine::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::into_graphql)?;

        OrderService::new(store(ctx)?)
            .create_order(caller(ctx), items)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn update_order_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        status: OrderStatus,
    ) -> Result<Order> {
        OrderService::new(store(ctx)?)
            .update_order_status(caller(ctx), arg_id(&id, "id")?, status)
            .await
            .map_err(AppError::into_graphql)
    }
}
