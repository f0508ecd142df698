//! In-memory [`Store`] used by tests and local experiments.
//!
//! Every collection lives behind one `tokio` mutex, so each call is atomic.
//! A checkout unit holds that mutex until it is committed or dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use craftcart_core::cart::CartLines;
use craftcart_core::{
    AdminLogId, CartId, CategoryId, Email, OrderId, OrderStatus, ProductId, ReviewId, Role, UserId,
};

use super::{CheckoutUnit, RepositoryError, Store};
use crate::models::{
    AdminLog, Cart, Category, CategoryPatch, NewAdminLog, NewCategory, NewOrder, NewProduct,
    NewReview, NewUser, Order, Product, ProductFilter, ProductPatch, Review, ReviewPatch, User,
};

#[derive(Default)]
struct Sequences {
    user: i32,
    category: i32,
    product: i32,
    cart: i32,
    order: i32,
    review: i32,
    admin_log: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, (User, String)>,
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    carts: BTreeMap<UserId, Cart>,
    orders: BTreeMap<OrderId, Order>,
    reviews: BTreeMap<ReviewId, Review>,
    admin_logs: Vec<AdminLog>,
    seq: Sequences,
}

/// Map-backed store mirroring [`super::PgStore`].
///
/// Product search is the exception: it matches whole words with no
/// stemming (see [`ProductFilter::matches`]).
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    admin_log_offline: Arc<AtomicBool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make audit log inserts fail, to exercise best-effort logging.
    pub fn set_admin_log_offline(&self, offline: bool) {
        self.admin_log_offline.store(offline, Ordering::SeqCst);
    }

    /// Every audit record written so far.
    pub async fn admin_logs(&self) -> Vec<AdminLog> {
        self.tables.lock().await.admin_logs.clone()
    }

    /// Number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.users.values().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let now = Utc::now();
        let created = User {
            id: UserId::new(next(&mut t.seq.user)),
            name: user.name,
            email: user.email,
            role: user.role,
            profile_image: user.profile_image,
            created_at: now,
            updated_at: now,
        };
        t.users
            .insert(created.id, (created.clone(), user.password_hash));
        Ok(created)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.user_credentials(email).await?.map(|(u, _)| u))
    }

    async fn user_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|(u, _)| &u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.users.values().map(|(u, _)| u.clone()).collect())
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<Option<User>, RepositoryError> {
        let mut t = self.tables.lock().await;
        Ok(t.users.get_mut(&id).map(|(u, _)| {
            u.role = role;
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.categories.values().any(|c| c.name == category.name) {
            return Err(RepositoryError::Conflict(
                "category name already exists".to_owned(),
            ));
        }
        let now = Utc::now();
        let created = Category {
            id: CategoryId::new(next(&mut t.seq.category)),
            name: category.name,
            description: category.description,
            created_at: now,
            updated_at: now,
        };
        t.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn category_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.categories.values().find(|c| c.name == name).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.tables.lock().await.categories.values().cloned().collect())
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, RepositoryError> {
        let mut t = self.tables.lock().await;
        if let Some(name) = &patch.name
            && t.categories.values().any(|c| c.id != id && &c.name == name)
        {
            return Err(RepositoryError::Conflict(
                "category name already exists".to_owned(),
            ));
        }
        Ok(t.categories.get_mut(&id).map(|c| {
            patch.apply_to(c);
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        Ok(self.tables.lock().await.categories.remove(&id).is_some())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        let created = Product {
            id: ProductId::new(next(&mut t.seq.product)),
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            images: product.images,
            category_id: product.category_id,
            artisan_id: product.artisan_id,
            created_at: now,
            updated_at: now,
        };
        t.products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| t.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn newest_products(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let t = self.tables.lock().await;
        let mut products: Vec<Product> = t.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        products.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(products)
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut t = self.tables.lock().await;
        Ok(t.products.get_mut(&id).map(|p| {
            patch.apply_to(p);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.tables.lock().await.products.remove(&id).is_some())
    }

    async fn delete_all_products(&self) -> Result<u64, RepositoryError> {
        let mut t = self.tables.lock().await;
        let count = t.products.len() as u64;
        t.products.clear();
        Ok(count)
    }

    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.tables.lock().await.carts.get(&user_id).cloned())
    }

    async fn save_cart(&self, user_id: UserId, lines: &CartLines) -> Result<Cart, RepositoryError> {
        let mut t = self.tables.lock().await;
        let id = match t.carts.get(&user_id).and_then(|c| c.id) {
            Some(id) => id,
            None => CartId::new(next(&mut t.seq.cart)),
        };
        let cart = Cart {
            id: Some(id),
            user_id,
            lines: lines.clone(),
        };
        t.carts.insert(user_id, cart.clone());
        Ok(cart)
    }

    async fn begin_checkout(&self) -> Result<Box<dyn CheckoutUnit>, RepositoryError> {
        let tables = Arc::clone(&self.tables).lock_owned().await;
        Ok(Box::new(MemoryCheckout {
            tables,
            quantities: HashMap::new(),
            orders: Vec::new(),
        }))
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.tables.lock().await.orders.values().cloned().collect())
    }

    async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.orders
            .values()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut t = self.tables.lock().await;
        Ok(t.orders.get_mut(&id).map(|o| {
            o.status = status;
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut t = self.tables.lock().await;
        if t.reviews
            .values()
            .any(|r| r.product_id == review.product_id && r.user_id == review.user_id)
        {
            return Err(RepositoryError::Conflict(
                "review already exists for this product".to_owned(),
            ));
        }
        let now = Utc::now();
        let created = Review {
            id: ReviewId::new(next(&mut t.seq.review)),
            product_id: review.product_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        t.reviews.insert(created.id, created.clone());
        Ok(created)
    }

    async fn review_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        Ok(self.tables.lock().await.reviews.get(&id).cloned())
    }

    async fn review_for_pair(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.reviews
            .values()
            .find(|r| r.product_id == product_id && r.user_id == user_id)
            .cloned())
    }

    async fn reviews_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.reviews
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn reviews_for_user(&self, user_id: UserId) -> Result<Vec<Review>, RepositoryError> {
        let t = self.tables.lock().await;
        Ok(t.reviews
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_review(
        &self,
        id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<Option<Review>, RepositoryError> {
        let mut t = self.tables.lock().await;
        Ok(t.reviews.get_mut(&id).map(|r| {
            patch.apply_to(r);
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        Ok(self.tables.lock().await.reviews.remove(&id).is_some())
    }

    async fn insert_admin_log(&self, entry: NewAdminLog) -> Result<AdminLog, RepositoryError> {
        if self.admin_log_offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::DataCorruption(
                "admin log unavailable".to_owned(),
            ));
        }
        let mut t = self.tables.lock().await;
        let created = AdminLog {
            id: AdminLogId::new(next(&mut t.seq.admin_log)),
            admin_id: entry.admin_id,
            action: entry.action,
            created_at: Utc::now(),
        };
        t.admin_logs.push(created.clone());
        Ok(created)
    }
}

/// Checkout unit holding the store lock with staged changes on the side.
struct MemoryCheckout {
    tables: OwnedMutexGuard<Tables>,
    quantities: HashMap<ProductId, i32>,
    orders: Vec<Order>,
}

#[async_trait]
impl CheckoutUnit for MemoryCheckout {
    async fn lock_products(
        &mut self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                let mut product = self.tables.products.get(id)?.clone();
                if let Some(&staged) = self.quantities.get(id) {
                    product.quantity = staged;
                }
                Some((*id, product))
            })
            .collect())
    }

    async fn set_product_quantity(
        &mut self,
        id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if !self.tables.products.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        self.quantities.insert(id, quantity);
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, RepositoryError> {
        let offset = i32::try_from(self.orders.len())
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let now = Utc::now();
        let staged = Order {
            id: OrderId::new(self.tables.seq.order + offset + 1),
            buyer_id: order.buyer_id,
            lines: order.lines,
            total: order.total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.orders.push(staged.clone());
        Ok(staged)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self {
            mut tables,
            quantities,
            orders,
        } = *self;
        let now = Utc::now();
        for (id, quantity) in quantities {
            if let Some(product) = tables.products.get_mut(&id) {
                product.quantity = quantity;
                product.updated_at = now;
            }
        }
        for order in orders {
            next(&mut tables.seq.order);
            tables.orders.insert(order.id, order);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    async fn seed_product(store: &MemoryStore, quantity: i32) -> Product {
        store
            .insert_product(NewProduct {
                name: "Ceramic Mug".to_owned(),
                description: "Artisan ceramic mug with unique glaze".to_owned(),
                price: Decimal::from_str("25.50").unwrap(),
                quantity,
                images: vec![],
                category_id: CategoryId::new(1),
                artisan_id: UserId::new(1),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_dropped_checkout_discards_changes() {
        let store = MemoryStore::new();
        let product = seed_product(&store, 5).await;

        {
            let mut unit = store.begin_checkout().await.unwrap();
            unit.set_product_quantity(product.id, 2).await.unwrap();
            let locked = unit.lock_products(&[product.id]).await.unwrap();
            assert_eq!(locked[&product.id].quantity, 2);
        }

        let reloaded = store.product_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 5);
    }

    #[tokio::test]
    async fn test_committed_checkout_applies_changes() {
        let store = MemoryStore::new();
        let product = seed_product(&store, 5).await;

        let mut unit = store.begin_checkout().await.unwrap();
        unit.set_product_quantity(product.id, 1).await.unwrap();
        let order = unit
            .insert_order(NewOrder {
                buyer_id: UserId::new(9),
                lines: vec![],
                total: Decimal::ZERO,
            })
            .await
            .unwrap();
        unit.commit().await.unwrap();

        assert_eq!(
            store.product_by_id(product.id).await.unwrap().unwrap().quantity,
            1
        );
        assert_eq!(store.order_by_id(order.id).await.unwrap().unwrap(), order);
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryStore::new();
        let email = Email::parse("amir@example.com").unwrap();
        let new_user = NewUser {
            name: "Amir Khan".to_owned(),
            email: email.clone(),
            password_hash: "hash".to_owned(),
            role: Role::Artisan,
            profile_image: None,
        };
        store.insert_user(new_user.clone()).await.unwrap();
        assert!(matches!(
            store.insert_user(new_user).await,
            Err(RepositoryError::Conflict(_))
        ));

        let review = NewReview {
            product_id: ProductId::new(1),
            user_id: UserId::new(1),
            rating: 5,
            comment: "Lovely".to_owned(),
        };
        store.insert_review(review.clone()).await.unwrap();
        assert!(matches!(
            store.insert_review(review).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_save_cart_keeps_id() {
        let store = MemoryStore::new();
        let user = UserId::new(4);
        let mut lines = CartLines::new();
        lines.add(ProductId::new(1), 2).unwrap();

        let first = store.save_cart(user, &lines).await.unwrap();
        lines.clear();
        let second = store.save_cart(user, &lines).await.unwrap();

        assert!(first.id.is_some());
        assert_eq!(first.id, second.id);
        assert!(second.lines.is_empty());
    }
}
