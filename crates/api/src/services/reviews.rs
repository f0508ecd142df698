//! Product reviews, at most one per (product, user).

use tracing::instrument;

use craftcart_core::validation::validate_rating;
use craftcart_core::{Operation, Principal, ProductId, ReviewId, UserId};

use crate::db::{RepositoryError, Store};
use crate::error::{AppError, Result};
use crate::models::{NewReview, Review, ReviewPatch};

const ALREADY_REVIEWED: &str = "You have already submitted a review for this product.";

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

pub struct ReviewService<'a> {
    store: &'a dyn Store,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Storage failures only.
    pub async fn product_reviews(&self, product_id: ProductId) -> Result<Vec<Review>> {
        Ok(self.store.reviews_for_product(product_id).await?)
    }

    /// # Errors
    ///
    /// Storage failures only.
    pub async fn user_reviews(&self, user_id: UserId) -> Result<Vec<Review>> {
        Ok(self.store.reviews_for_user(user_id).await?)
    }

    /// # Errors
    ///
    /// `Validation` for a rating outside 1..=5, `NotFound` for an unknown
    /// product, `Conflict` if the caller already reviewed it.
    #[instrument(skip_all, fields(product_id = %input.product_id))]
    pub async fn create_review(
        &self,
        caller: Option<&Principal>,
        input: ReviewInput,
    ) -> Result<Review> {
        let caller = Operation::CreateReview.require(caller)?;
        validate_rating(input.rating).map_err(|e| {
            AppError::validation("Failed to create review due to validation errors.", vec![e])
        })?;

        if self.store.product_by_id(input.product_id).await?.is_none() {
            return Err(AppError::NotFound("Product not found.".to_string()));
        }
        if self
            .store
            .review_for_pair(input.product_id, caller.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(ALREADY_REVIEWED.to_string()));
        }

        // A concurrent duplicate that slipped past the read still hits the
        // unique index.
        let review = self
            .store
            .insert_review(NewReview {
                product_id: input.product_id,
                user_id: caller.id,
                rating: input.rating,
                comment: input.comment,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AppError::Conflict(ALREADY_REVIEWED.to_string()),
                other => other.into(),
            })?;

        tracing::info!(review_id = %review.id, "Review created");
        Ok(review)
    }

    /// Update a review. Only its author may.
    ///
    /// # Errors
    ///
    /// `NotFoundOrForbidden` when the review is missing or not the caller's.
    #[instrument(skip(self, caller, input), fields(review_id = %id))]
    pub async fn update_review(
        &self,
        caller: Option<&Principal>,
        id: ReviewId,
        input: ReviewUpdate,
    ) -> Result<Review> {
        let caller = Operation::UpdateReview.require(caller)?;
        if let Some(rating) = input.rating {
            validate_rating(rating).map_err(|e| {
                AppError::validation("Failed to update review due to validation errors.", vec![e])
            })?;
        }

        let denied = || {
            AppError::NotFoundOrForbidden(
                "Review not found or you are not authorized to update it.".to_string(),
            )
        };
        let review = self.store.review_by_id(id).await?.ok_or_else(denied)?;
        Operation::UpdateReview
            .check_owner(caller, review.user_id)
            .map_err(|_| denied())?;

        self.store
            .update_review(
                id,
                ReviewPatch {
                    rating: input.rating,
                    comment: input.comment,
                },
            )
            .await?
            .ok_or_else(denied)
    }

    /// Delete a review, as its author or an administrator.
    ///
    /// # Errors
    ///
    /// `NotFoundOrForbidden` when the review is missing or the caller may
    /// not remove it.
    #[instrument(skip(self, caller), fields(review_id = %id))]
    pub async fn delete_review(&self, caller: Option<&Principal>, id: ReviewId) -> Result<bool> {
        let caller = Operation::DeleteReview.require(caller)?;

        let denied = || {
            AppError::NotFoundOrForbidden(
                "Review not found or you are not authorized to delete it.".to_string(),
            )
        };
        let review = self.store.review_by_id(id).await?.ok_or_else(denied)?;
        Operation::DeleteReview
            .check_owner(caller, review.user_id)
            .map_err(|_| denied())?;

        if !self.store.delete_review(id).await? {
            return Err(denied());
        }
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use craftcart_core::{CategoryId, Role};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewProduct;

    fn principal(id: i32, role: Role) -> Principal {
        Principal {
            id: UserId::new(id),
            email: format!("user{id}@craftcart.test"),
            role,
        }
    }

    async fn seed_product(store: &MemoryStore) -> ProductId {
        store
            .insert_product(NewProduct {
                name: "Ceramic Mug".to_string(),
                description: "Stoneware".to_string(),
                price: Decimal::new(1875, 2),
                quantity: 5,
                images: vec![],
                category_id: CategoryId::new(1),
                artisan_id: UserId::new(2),
            })
            .await
            .unwrap()
            .id
    }

    fn input(product_id: ProductId) -> ReviewInput {
        ReviewInput {
            product_id,
            rating: 5,
            comment: "Lovely glaze".to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_review_conflicts() {
        let store = MemoryStore::new();
        let mug = seed_product(&store).await;
        let author = principal(10, Role::Buyer);
        let reviews = ReviewService::new(&store);

        reviews.create_review(Some(&author), input(mug)).await.unwrap();
        let again = reviews.create_review(Some(&author), input(mug)).await;
        assert!(matches!(again, Err(AppError::Conflict(ref m)) if m == ALREADY_REVIEWED));
        assert_eq!(reviews.product_reviews(mug).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rating_bounds_and_unknown_product() {
        let store = MemoryStore::new();
        let mug = seed_product(&store).await;
        let author = principal(10, Role::Buyer);
        let reviews = ReviewService::new(&store);

        let mut bad = input(mug);
        bad.rating = 6;
        assert!(matches!(
            reviews.create_review(Some(&author), bad).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            reviews
                .create_review(Some(&author), input(ProductId::new(404)))
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_only_author_updates() {
        let store = MemoryStore::new();
        let mug = seed_product(&store).await;
        let author = principal(10, Role::Buyer);
        let other = principal(11, Role::Buyer);
        let admin = principal(1, Role::Admin);
        let reviews = ReviewService::new(&store);
        let review = reviews.create_review(Some(&author), input(mug)).await.unwrap();

        let change = ReviewUpdate {
            rating: None,
            comment: Some("Changed".to_string()),
        };
        for intruder in [&other, &admin] {
            assert!(matches!(
                reviews
                    .update_review(Some(intruder), review.id, change.clone())
                    .await,
                Err(AppError::NotFoundOrForbidden(_))
            ));
        }
        assert_eq!(
            store.review_by_id(review.id).await.unwrap().unwrap().comment,
            "Lovely glaze"
        );

        let updated = reviews
            .update_review(Some(&author), review.id, change)
            .await
            .unwrap();
        assert_eq!(updated.comment, "Changed");
        assert_eq!(updated.rating, 5);
    }

    #[tokio::test]
    async fn test_delete_by_author_or_admin() {
        let store = MemoryStore::new();
        let mug = seed_product(&store).await;
        let author = principal(10, Role::Buyer);
        let other = principal(11, Role::Buyer);
        let admin = principal(1, Role::Admin);
        let reviews = ReviewService::new(&store);

        let review = reviews.create_review(Some(&author), input(mug)).await.unwrap();
        assert!(matches!(
            reviews.delete_review(Some(&other), review.id).await,
            Err(AppError::NotFoundOrForbidden(_))
        ));
        assert!(reviews.delete_review(Some(&admin), review.id).await.unwrap());
        assert!(reviews.product_reviews(mug).await.unwrap().is_empty());

        assert!(matches!(
            reviews.delete_review(Some(&author), review.id).await,
            Err(AppError::NotFoundOrForbidden(_))
        ));
    }
}
