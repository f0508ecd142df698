//! Category and product resolvers.

use async_graphql::{Context, ID, Object, Result};

use crate::error::AppError;
use crate::models::{Category, Product, ProductFilter};
use crate::services::CatalogService;

use super::inputs::{
    CategoryInput, CategoryUpdateInput, ProductFilterInput, ProductInput, ProductUpdateInput,
};
use super::{arg_id, caller, store};

#[derive(Default)]
pub struct CatalogQuery;

#[Object]
impl CatalogQuery {
    async fn categories(&self, ctx: &Context<'_>) -> Result<Vec<Category>> {
        CatalogService::new(store(ctx)?)
            .categories()
            .await
            .map_err(AppError::into_graphql)
    }

    async fn category(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Category>> {
        CatalogService::new(store(ctx)?)
            .category(arg_id(&id, "id")?)
            .await
            .map_err(AppError::into_graphql)
    }

    /// Every product matching the filter. No pagination.
    async fn products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilterInput>,
    ) -> Result<Vec<Product>> {
        let filter = ProductFilter::try_from(filter.unwrap_or_default())
            .map_err(AppError::into_graphql)?;
        CatalogService::new(store(ctx)?)
            .products(&filter)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Product> {
        CatalogService::new(store(ctx)?)
            .product(arg_id(&id, "id")?)
            .await
            .map_err(AppError::into_graphql)
    }

    /// Newest products first, five unless `limit` is given.
    async fn featured_products(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
    ) -> Result<Vec<Product>> {
        CatalogService::new(store(ctx)?)
            .featured_products(limit)
            .await
            .map_err(AppError::into_graphql)
    }
}

#[derive(Default)]
pub struct CatalogMutation;

#[Object]
impl CatalogMutation {
    async fn create_category(&self, ctx: &Context<'_>, input: CategoryInput) -> Result<Category> {
        CatalogService::new(store(ctx)?)
            .create_category(caller(ctx), input.into())
            .await
            .map_err(AppError::into_graphql)
    }

    async fn update_category(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: CategoryUpdateInput,
    ) -> Result<Category> {
        CatalogService::new(store(ctx)?)
            .update_category(caller(ctx), arg_id(&id, "id")?, input.into())
            .await
            .map_err(AppError::into_graphql)
    }

    async fn delete_category(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        CatalogService::new(store(ctx)?)
            .delete_category(caller(ctx), arg_id(&id, "id")?)
            .await
            .map_err(AppError::into_graphql)
    }

    async fn create_product(&self, ctx: &Context<'_>, input: ProductInput) -> Result<Product> {
        CatalogService::new(store(ctx)?)
            .create_product(caller(ctx), input.into())
            .await
            .map_err(AppError::into_graphql)
    }

    async fn update_product(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: ProductUpdateInput,
    ) -> Result<Product> {
        CatalogService::new(store(ctx)?)
            .update_product(caller(ctx), arg_id(&id, "id")?, input.into())
            .await
            .map_err(AppError::into_graphql)
    }

    async fn delete_product(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        CatalogService::new(store(ctx)?)
            .delete_product(caller(ctx), arg_id(&id, "id")?)
            .await
            .map_err(AppError::into_graphql)
    }
}
