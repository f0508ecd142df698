//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use craftcart_core::order::OrderLine;
use craftcart_core::{OrderId, OrderStatus, UserId};

/// A placed order. Lines and total are fixed at creation; only `status`
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}
