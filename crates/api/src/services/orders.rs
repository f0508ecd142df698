//! Order placement and administration.
//!
//! `create_order` runs every line inside one checkout unit. The request's
//! products are locked up front in ascending id order, and any failing line
//! abandons the unit, so either every decrement and the order land together
//! or nothing does.

use tracing::instrument;

use craftcart_core::order::{
    OrderLine, RequestedLine, check_request, lock_order, order_total, take_stock,
};
use craftcart_core::{Operation, OrderId, OrderStatus, Principal};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{NewOrder, Order};
use crate::services::audit;

pub struct OrderService<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Every order in the system.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `Forbidden` for anyone but an administrator.
    pub async fn orders(&self, caller: Option<&Principal>) -> Result<Vec<Order>> {
        Operation::Orders.require(caller)?;
        Ok(self.store.list_orders().await?)
    }

    /// One order, for its buyer or an administrator.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Forbidden` for anyone else's order.
    pub async fn order(&self, caller: Option<&Principal>, id: OrderId) -> Result<Order> {
        let caller = Operation::Order.require(caller)?;
        let order = self
            .store
            .order_by_id(id)
            .await?
            .ok_or_else(|| order_not_found(id))?;
        Operation::Order.check_owner(caller, order.buyer_id)?;
        Ok(order)
    }

    /// The caller's own orders.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a session.
    pub async fn my_orders(&self, caller: Option<&Principal>) -> Result<Vec<Order>> {
        let caller = Operation::MyOrders.require(caller)?;
        Ok(self.store.orders_for_buyer(caller.id).await?)
    }

    /// Place an order, decrementing stock and snapshotting prices.
    ///
    /// # Errors
    ///
    /// `BadRequest` for an empty request or a non-positive quantity,
    /// `NotFound` for an unknown product, `InsufficientStock` when a line
    /// asks for more than is left. No stock changes and no order is created
    /// in any of these cases.
    #[instrument(skip_all, fields(lines = items.len()))]
    pub async fn create_order(
        &self,
        caller: Option<&Principal>,
        items: Vec<RequestedLine>,
    ) -> Result<Order> {
        let caller = Operation::CreateOrder.require(caller)?;
        check_request(&items)?;

        let locked = lock_order(&items);
        let mut unit = self.store.begin_checkout().await?;
        let mut products = unit.lock_products(&locked).await?;
        let mut lines = Vec::with_capacity(items.len());

        for item in &items {
            let product = products.get_mut(&item.product_id).ok_or_else(|| {
                AppError::NotFound(format!("Product with ID {} not found.", item.product_id))
            })?;

            product.quantity = take_stock(product.quantity, item.quantity).ok_or_else(|| {
                AppError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.quantity,
                }
            })?;

            lines.push(OrderLine {
                product_id: product.id,
                quantity: item.quantity,
                price_at_purchase: product.price,
            });
        }

        for id in &locked {
            if let Some(product) = products.get(id) {
                unit.set_product_quantity(*id, product.quantity).await?;
            }
        }

        let total = order_total(&lines);
        let order = unit
            .insert_order(NewOrder {
                buyer_id: caller.id,
                lines,
                total,
            })
            .await?;
        unit.commit().await?;

        tracing::info!(order_id = %order.id, buyer_id = %caller.id, total = %order.total, "Order placed");
        Ok(order)
    }

    /// Overwrite an order's status. Any status may follow any other, and
    /// cancelling does not restock.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-administrators, `NotFound` for an unknown id.
    #[instrument(skip(self, caller), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        caller: Option<&Principal>,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order> {
        let caller = Operation::UpdateOrderStatus.require(caller)?;

        let order = self
            .store
            .set_order_status(id, status)
            .await?
            .ok_or_else(|| order_not_found(id))?;

        audit::record(
            self.store,
            caller,
            format!("Updated order status: order {id} is now {status}"),
        )
        .await;

        Ok(order)
    }
}

fn order_not_found(id: OrderId) -> AppError {
    AppError::NotFound(format!("Order with ID '{id}' not found."))
}
