//! GraphQL surface of the marketplace.
//!
//! Resolvers are thin: parse arguments, hand the caller's principal to a
//! service, and map [`AppError`] into a GraphQL error. Each area (users,
//! catalog, cart, orders, reviews) contributes one query and one mutation
//! object, merged into the roots in [`schema`].
//!
//! Schema data holds the `Arc<dyn Store>` and the [`TokenService`]. The
//! caller's [`Principal`], when there is one, is attached per request.

mod cart;
mod catalog;
pub mod inputs;
mod orders;
mod reviews;
pub mod schema;
pub mod types;
mod users;

use std::str::FromStr;
use std::sync::Arc;

use async_graphql::{Context, ID, Result};

use craftcart_core::Principal;

use crate::db::Store;
use crate::error::AppError;
use crate::services::TokenService;

pub use schema::{CraftSchema, MutationRoot, QueryRoot, build_schema};

fn store<'a>(ctx: &Context<'a>) -> Result<&'a dyn Store> {
    Ok(ctx.data::<Arc<dyn Store>>()?.as_ref())
}

fn tokens<'a>(ctx: &Context<'a>) -> Result<&'a TokenService> {
    ctx.data::<TokenService>()
}

/// The authenticated caller, if the request carried a valid token.
fn caller<'a>(ctx: &Context<'a>) -> Option<&'a Principal> {
    ctx.data_opt::<Principal>()
}

fn arg_id<T: FromStr>(id: &ID, field: &str) -> Result<T> {
    inputs::parse_id(id, field).map_err(AppError::into_graphql)
}
