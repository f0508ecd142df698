//! Relation loaders.
//!
//! Entities hold plain id references. Each function here resolves one
//! relation, and GraphQL field resolvers call it only when that field is
//! selected. A reference whose target is gone resolves to `None` or is
//! skipped, never to an error.

use std::collections::HashMap;

use rust_decimal::Decimal;

use craftcart_core::cart::CartLines;
use craftcart_core::order::OrderLine;
use craftcart_core::{CategoryId, ProductId, UserId};

use crate::db::Store;
use crate::error::Result;
use crate::models::{Category, Order, Product, ProductFilter, Review, User};

// =============================================================================
// Product relations
// =============================================================================

/// Product -> category.
pub async fn category_of(store: &dyn Store, product: &Product) -> Result<Option<Category>> {
    Ok(store.category_by_id(product.category_id).await?)
}

/// Product -> artisan.
pub async fn artisan_of(store: &dyn Store, product: &Product) -> Result<Option<User>> {
    Ok(store.user_by_id(product.artisan_id).await?)
}

/// Product -> reviews.
pub async fn reviews_of(store: &dyn Store, product: &Product) -> Result<Vec<Review>> {
    Ok(store.reviews_for_product(product.id).await?)
}

// =============================================================================
// Review relations
// =============================================================================

/// Review -> author.
pub async fn author_of(store: &dyn Store, review: &Review) -> Result<Option<User>> {
    Ok(store.user_by_id(review.user_id).await?)
}

/// Review -> product.
pub async fn reviewed_product(store: &dyn Store, review: &Review) -> Result<Option<Product>> {
    Ok(store.product_by_id(review.product_id).await?)
}

// =============================================================================
// Cart and order line relations
// =============================================================================

/// Products keyed by id, one storage round trip for the whole set.
pub async fn products_by_id(
    store: &dyn Store,
    ids: impl IntoIterator<Item = ProductId>,
) -> Result<HashMap<ProductId, Product>> {
    let mut ids: Vec<ProductId> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(store
        .products_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect())
}

/// Cart line -> product, for every line at once.
pub async fn cart_products(
    store: &dyn Store,
    lines: &CartLines,
) -> Result<HashMap<ProductId, Product>> {
    products_by_id(store, lines.as_slice().iter().map(|line| line.product_id)).await
}

/// Current-price subtotal of a cart. Lines whose product is gone count 0.
pub async fn cart_subtotal(store: &dyn Store, lines: &CartLines) -> Result<Decimal> {
    let products = cart_products(store, lines).await?;
    Ok(lines.subtotal(|id| products.get(&id).map(|p| p.price)))
}

/// Order line -> product, for every line at once.
pub async fn order_products(
    store: &dyn Store,
    lines: &[OrderLine],
) -> Result<HashMap<ProductId, Product>> {
    products_by_id(store, lines.iter().map(|line| line.product_id)).await
}

/// Order -> buyer.
pub async fn buyer_of(store: &dyn Store, order: &Order) -> Result<Option<User>> {
    Ok(store.user_by_id(order.buyer_id).await?)
}

/// Cart -> owner.
pub async fn user_by_id(store: &dyn Store, id: UserId) -> Result<Option<User>> {
    Ok(store.user_by_id(id).await?)
}

// =============================================================================
// User and category relations
// =============================================================================

/// User -> products listed as artisan.
pub async fn products_of_artisan(store: &dyn Store, user: &User) -> Result<Vec<Product>> {
    Ok(store
        .list_products(&ProductFilter::by_artisan(user.id))
        .await?)
}

/// User -> reviews written.
pub async fn reviews_by(store: &dyn Store, user: &User) -> Result<Vec<Review>> {
    Ok(store.reviews_for_user(user.id).await?)
}

/// User -> orders placed. Visibility is checked by the caller.
pub async fn orders_by(store: &dyn Store, user: &User) -> Result<Vec<Order>> {
    Ok(store.orders_for_buyer(user.id).await?)
}

/// Category -> products.
pub async fn products_in(store: &dyn Store, category_id: CategoryId) -> Result<Vec<Product>> {
    Ok(store
        .list_products(&ProductFilter::by_category(category_id))
        .await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftcart_core::{Email, Role};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewCategory, NewProduct, NewUser};

    async fn seed(store: &MemoryStore) -> (User, Category, Product) {
        let artisan = store
            .insert_user(NewUser {
                name: "Mara Potter".to_string(),
                email: Email::parse("mara@craftcart.test").unwrap(),
                password_hash: "x".to_string(),
                role: Role::Artisan,
                profile_image: None,
            })
            .await
            .unwrap();
        let category = store
            .insert_category(NewCategory {
                name: "Ceramics".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let product = store
            .insert_product(NewProduct {
                name: "Ceramic Mug".to_string(),
                description: "Stoneware".to_string(),
                price: Decimal::new(1875, 2),
                quantity: 5,
                images: vec![],
                category_id: category.id,
                artisan_id: artisan.id,
            })
            .await
            .unwrap();
        (artisan, category, product)
    }

    #[tokio::test]
    async fn test_product_relations() {
        let store = MemoryStore::new();
        let (artisan, category, product) = seed(&store).await;

        assert_eq!(category_of(&store, &product).await.unwrap(), Some(category.clone()));
        assert_eq!(artisan_of(&store, &product).await.unwrap(), Some(artisan.clone()));
        assert_eq!(products_in(&store, category.id).await.unwrap(), vec![product.clone()]);
        assert_eq!(products_of_artisan(&store, &artisan).await.unwrap(), vec![product]);
    }

    #[tokio::test]
    async fn test_deleted_category_resolves_to_none() {
        let store = MemoryStore::new();
        let (_, category, product) = seed(&store).await;
        store.delete_category(category.id).await.unwrap();

        assert!(category_of(&store, &product).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cart_subtotal_skips_missing_products() {
        let store = MemoryStore::new();
        let (_, _, mug) = seed(&store).await;

        let mut lines = CartLines::new();
        lines.add(mug.id, 2).unwrap();
        lines.add(ProductId::new(999), 4).unwrap();

        assert_eq!(cart_subtotal(&store, &lines).await.unwrap(), Decimal::new(3750, 2));
        assert_eq!(cart_products(&store, &lines).await.unwrap().len(), 1);
    }
}
