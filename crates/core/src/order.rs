//! Order line snapshots and checkout arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, money};

/// A requested `(product, quantity)` pair submitted to checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A priced line recorded on an order. Never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        money::line_total(self.price_at_purchase, self.quantity)
    }
}

/// Problems with a checkout request that are detectable before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Cannot create an order with no items.")]
    Empty,
    #[error("Quantity must be at least 1.")]
    NonPositiveQuantity(ProductId),
}

/// Reject empty requests and non-positive quantities.
///
/// # Errors
///
/// See [`RequestError`].
pub fn check_request(lines: &[RequestedLine]) -> Result<(), RequestError> {
    if lines.is_empty() {
        return Err(RequestError::Empty);
    }
    if let Some(bad) = lines.iter().find(|line| line.quantity < 1) {
        return Err(RequestError::NonPositiveQuantity(bad.product_id));
    }
    Ok(())
}

/// Stock left after taking `requested` units, or `None` when short.
#[must_use]
pub const fn take_stock(available: i32, requested: i32) -> Option<i32> {
    if requested <= available {
        Some(available - requested)
    } else {
        None
    }
}

/// Distinct products of a request in ascending id order.
///
/// Checkouts lock product rows in this order so two requests naming the
/// same products never wait on each other in a cycle.
#[must_use]
pub fn lock_order(lines: &[RequestedLine]) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Sum of `quantity * price_at_purchase` across every line.
#[must_use]
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(OrderLine::line_total).sum()
}
