//! Root objects and schema construction.

use std::sync::Arc;

use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::Store;
use crate::services::TokenService;

use super::cart::{CartMutation, CartQuery};
use super::catalog::{CatalogMutation, CatalogQuery};
use super::orders::{OrderMutation, OrderQuery};
use super::reviews::{ReviewMutation, ReviewQuery};
use super::users::{UserMutation, UserQuery};

pub type CraftSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(UserQuery, CatalogQuery, CartQuery, OrderQuery, ReviewQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    UserMutation,
    CatalogMutation,
    CartMutation,
    OrderMutation,
    ReviewMutation,
);

/// Build the schema over a store.
#[must_use]
pub fn build_schema(store: Arc<dyn Store>, tokens: TokenService) -> CraftSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(store)
    .data(tokens)
    .finish()
}
