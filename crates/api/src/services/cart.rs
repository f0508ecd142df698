//! Per-user shopping carts.
//!
//! Cart lines are reservations only: adding checks the product's current
//! stock but holds nothing back from other buyers.

use tracing::instrument;

use craftcart_core::cart::{CartError, CartLines};
use craftcart_core::{Operation, Principal, ProductId};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::Cart;

/// Units `addToCart` adds when no quantity is given.
pub const DEFAULT_ADD_QUANTITY: i32 = 1;

pub struct CartService<'a> {
    store: &'a dyn Store,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// The caller's cart, or an unsaved empty one if they never had one.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a session.
    pub async fn my_cart(&self, caller: Option<&Principal>) -> Result<Cart> {
        let caller = Operation::MyCart.require(caller)?;
        Ok(self
            .store
            .cart_for_user(caller.id)
            .await?
            .unwrap_or_else(|| Cart::empty(caller.id)))
    }

    /// Add units of a product, creating the cart on first use.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a quantity below 1 or more than the current stock,
    /// `NotFound` for an unknown product.
    #[instrument(skip(self, caller))]
    pub async fn add_to_cart(
        &self,
        caller: Option<&Principal>,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart> {
        let caller = Operation::AddToCart.require(caller)?;
        if quantity < 1 {
            return Err(CartError::QuantityBelowOne.into());
        }

        let product = self
            .store
            .product_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;
        if product.quantity < quantity {
            return Err(AppError::BadRequest(format!(
                "Not enough stock. Only {} available.",
                product.quantity
            )));
        }

        let mut lines = self.lines_or_empty(caller).await?;
        lines.add(product_id, quantity)?;
        Ok(self.store.save_cart(caller.id, &lines).await?)
    }

    /// Drop a product's line. A missing line is not an error.
    ///
    /// # Errors
    ///
    /// `NotFound` when the caller has never had a cart.
    #[instrument(skip(self, caller))]
    pub async fn remove_from_cart(
        &self,
        caller: Option<&Principal>,
        product_id: ProductId,
    ) -> Result<Cart> {
        let caller = Operation::RemoveFromCart.require(caller)?;
        let mut lines = self.existing_lines(caller).await?;
        lines.remove(product_id);
        Ok(self.store.save_cart(caller.id, &lines).await?)
    }

    /// Overwrite a line's quantity; below 1 removes the line.
    ///
    /// Stock is not re-checked.
    ///
    /// # Errors
    ///
    /// `NotFound` when the caller has no cart, or when `quantity >= 1` and
    /// the product is not in the cart.
    #[instrument(skip(self, caller))]
    pub async fn update_cart_item(
        &self,
        caller: Option<&Principal>,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart> {
        let caller = Operation::UpdateCartItem.require(caller)?;
        let mut lines = self.existing_lines(caller).await?;
        lines.set_quantity(product_id, quantity)?;
        Ok(self.store.save_cart(caller.id, &lines).await?)
    }

    /// Empty the caller's cart. Never creates one.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a session.
    #[instrument(skip_all)]
    pub async fn clear_cart(&self, caller: Option<&Principal>) -> Result<bool> {
        let caller = Operation::ClearCart.require(caller)?;
        if self.store.cart_for_user(caller.id).await?.is_some() {
            self.store.save_cart(caller.id, &CartLines::new()).await?;
        }
        Ok(true)
    }

    async fn lines_or_empty(&self, caller: &Principal) -> Result<CartLines> {
        Ok(self
            .store
            .cart_for_user(caller.id)
            .await?
            .map(|cart| cart.lines)
            .unwrap_or_default())
    }

    async fn existing_lines(&self, caller: &Principal) -> Result<CartLines> {
        self.store
            .cart_for_user(caller.id)
            .await?
            .map(|cart| cart.lines)
            .ok_or_else(|| AppError::NotFound("You don't have a cart yet.".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use craftcart_core::{CategoryId, Role, UserId};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewProduct;

    fn buyer() -> Principal {
        Principal {
            id: UserId::new(10),
            email: "buyer@craftcart.test".to_string(),
            role: Role::Buyer,
        }
    }

    async fn seed_product(store: &MemoryStore, quantity: i32) -> ProductId {
        store
            .insert_product(NewProduct {
                name: "Ceramic Mug".to_string(),
                description: "Stoneware".to_string(),
                price: Decimal::new(1875, 2),
                quantity,
                images: vec![],
                category_id: CategoryId::new(1),
                artisan_id: UserId::new(2),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_my_cart_is_synthetic_when_absent() {
        let store = MemoryStore::new();
        let cart = CartService::new(&store).my_cart(Some(&buyer())).await.unwrap();
        assert!(cart.id.is_none());
        assert!(cart.lines.is_empty());
        assert!(store.cart_for_user(buyer().id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_to_cart_accumulates() {
        let store = MemoryStore::new();
        let mug = seed_product(&store, 10).await;
        let carts = CartService::new(&store);

        carts.add_to_cart(Some(&buyer()), mug, 2).await.unwrap();
        let cart = carts.add_to_cart(Some(&buyer()), mug, 3).await.unwrap();
        assert!(cart.id.is_some());
        assert_eq!(cart.lines.quantity_of(mug), 5);
    }

    #[tokio::test]
    async fn test_add_to_cart_rejections() {
        let store = MemoryStore::new();
        let mug = seed_product(&store, 2).await;
        let carts = CartService::new(&store);

        assert!(matches!(
            carts.add_to_cart(None, mug, 1).await,
            Err(AppError::Unauthenticated)
        ));
        assert!(matches!(
            carts.add_to_cart(Some(&buyer()), mug, 0).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            carts.add_to_cart(Some(&buyer()), ProductId::new(99), 1).await,
            Err(AppError::NotFound(_))
        ));
        let result = carts.add_to_cart(Some(&buyer()), mug, 3).await;
        assert!(
            matches!(result, Err(AppError::BadRequest(ref m)) if m == "Not enough stock. Only 2 available.")
        );
    }

    #[tokio::test]
    async fn test_update_cart_item() {
        let store = MemoryStore::new();
        let mug = seed_product(&store, 10).await;
        let other = seed_product(&store, 10).await;
        let carts = CartService::new(&store);

        assert!(matches!(
            carts.update_cart_item(Some(&buyer()), mug, 1).await,
            Err(AppError::NotFound(_))
        ));

        carts.add_to_cart(Some(&buyer()), mug, 1).await.unwrap();
        let cart = carts
            .update_cart_item(Some(&buyer()), mug, 25)
            .await
            .unwrap();
        assert_eq!(cart.lines.quantity_of(mug), 25);

        assert!(matches!(
            carts.update_cart_item(Some(&buyer()), other, 1).await,
            Err(AppError::NotFound(_))
        ));

        let cart = carts.update_cart_item(Some(&buyer()), other, 0).await.unwrap();
        assert_eq!(cart.lines.quantity_of(mug), 25);
        let cart = carts.update_cart_item(Some(&buyer()), mug, 0).await.unwrap();
        assert!(cart.lines.is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = MemoryStore::new();
        let mug = seed_product(&store, 10).await;
        let carts = CartService::new(&store);

        assert!(matches!(
            carts.remove_from_cart(Some(&buyer()), mug).await,
            Err(AppError::NotFound(ref m)) if m == "You don't have a cart yet."
        ));
        assert!(carts.clear_cart(Some(&buyer())).await.unwrap());
        assert!(store.cart_for_user(buyer().id).await.unwrap().is_none());

        carts.add_to_cart(Some(&buyer()), mug, 1).await.unwrap();
        let cart = carts.remove_from_cart(Some(&buyer()), mug).await.unwrap();
        assert!(cart.lines.is_empty());

        carts.add_to_cart(Some(&buyer()), mug, 4).await.unwrap();
        assert!(carts.clear_cart(Some(&buyer())).await.unwrap());
        let cart = carts.my_cart(Some(&buyer())).await.unwrap();
        assert!(cart.id.is_some());
        assert!(cart.lines.is_empty());
    }
}
