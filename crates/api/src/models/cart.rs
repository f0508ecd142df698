//! Cart domain type.

use craftcart_core::cart::CartLines;
use craftcart_core::{CartId, UserId};

/// A user's cart.
///
/// `id` is `None` for the synthetic empty cart returned to users who have
/// never added anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: Option<CartId>,
    pub user_id: UserId,
    pub lines: CartLines,
}

impl Cart {
    /// An unsaved, empty cart for `user_id`.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            id: None,
            user_id,
            lines: CartLines::new(),
        }
    }
}
