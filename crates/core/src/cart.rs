//! Cart aggregate rules.
//!
//! A cart is an ordered list of `(product, quantity)` lines, at most one line
//! per product, every quantity at least 1. Totals are derived on read and
//! never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, money};

/// One cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Errors raised by cart line edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Quantity must be at least 1.")]
    QuantityBelowOne,
    #[error("Product not found in cart.")]
    LineNotFound(ProductId),
}

/// The line list of a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLines(Vec<CartLine>);

impl CartLines {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CartLine] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<CartLine> {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quantity currently held for `product_id`, or 0.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> i32 {
        self.position(product_id)
            .and_then(|i| self.0.get(i))
            .map_or(0, |line| line.quantity)
    }

    /// Add `quantity` units of a product. Existing lines accumulate; new
    /// products are appended.
    ///
    /// # Errors
    ///
    /// `QuantityBelowOne` when `quantity < 1`.
    pub fn add(&mut self, product_id: ProductId, quantity: i32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::QuantityBelowOne);
        }
        match self.position(product_id).and_then(|i| self.0.get_mut(i)) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.0.push(CartLine {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    /// Drop the line for a product. Absent lines are ignored.
    pub fn remove(&mut self, product_id: ProductId) {
        self.0.retain(|line| line.product_id != product_id);
    }

    /// Overwrite a line's quantity.
    ///
    /// Below 1 removes the line (silently when absent). Otherwise the line
    /// must already exist. Stock is not consulted.
    ///
    /// # Errors
    ///
    /// `LineNotFound` when `quantity >= 1` and the product has no line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i32) -> Result<(), CartError> {
        if quantity < 1 {
            self.remove(product_id);
            return Ok(());
        }
        let line = self
            .position(product_id)
            .and_then(|i| self.0.get_mut(i))
            .ok_or(CartError::LineNotFound(product_id))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.0.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Sum of `quantity * price` using current prices.
    ///
    /// Lines whose product is gone contribute nothing.
    pub fn subtotal<F>(&self, mut price_of: F) -> Decimal
    where
        F: FnMut(ProductId) -> Option<Decimal>,
    {
        self.0
            .iter()
            .filter_map(|line| {
                price_of(line.product_id).map(|price| money::line_total(price, line.quantity))
            })
            .sum()
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.0.iter().position(|line| line.product_id == product_id)
    }
}

impl From<Vec<CartLine>> for CartLines {
    fn from(lines: Vec<CartLine>) -> Self {
        Self(lines)
    }
}

impl<'a> IntoIterator for &'a CartLines {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
