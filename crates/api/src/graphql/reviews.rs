//! Review resolvers.

use async_graphql::{Context, ID, Object, Result};

use crate::error::AppError;
use crate::models::Review;
use crate::services::{ReviewInput as NewReviewRequest, ReviewService, ReviewUpdate};

use super::inputs::ReviewInput;
use super::{arg_id, caller, store};

#[derive(Default)]
pub struct ReviewQuery;

#[Object]
impl ReviewQuery {
    async fn product_reviews(&self, ctx: &Context<'_>, product_id: ID) -> Result<Vec<Review>> {
        ReviewService::new(store(ctx)?)
            .product_reviews(arg_id(&product_id, "productId")?)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn user_reviews(&self, ctx: &Context<'_>, user_id: ID) -> Result<Vec<Review>> {
        ReviewService::new(store(ctx)?)
            .user_reviews(arg_id(&user_id, "userId")?)
            .await
            .map_err(AppError::into_graphql)
    }
}

#[derive(Default)]
pub struct ReviewMutation;

#[Object]
impl ReviewMutation {
    async fn create_review(&self, ctx: &Context<'_>, input: ReviewInput) -> Result<Review> {
        let input = NewReviewRequest::try_from(input).map_err(AppError::into_graphql)?;
        ReviewService::new(store(ctx)?)
            .create_review(caller(ctx), input)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn update_review(
        &self,
        ctx: &Context<'_>,
        id: ID,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> Result<Review> {
        ReviewService::new(store(ctx)?)
            .update_review(
                caller(ctx),
                arg_id(&id, "id")?,
                ReviewUpdate { rating, comment },
            )
            .await
            .map_err(AppError::into_graphql)
    }

    async fn delete_review(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        ReviewService::new(store(ctx)?)
            .delete_review(caller(ctx), arg_id(&id, "id")?)
            .await
            .map_err(AppError::into_graphql)
    }
}
