//! Account queries, registration and login.

use async_graphql::{Context, ID, Object, Result};

use craftcart_core::Role;

use crate::error::AppError;
use crate::models::User;
use crate::services::{AuthPayload, AuthService, UserService};

use super::inputs::{LoginInput, RegisterInput};
use super::{arg_id, caller, store, tokens};

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The caller's own account.
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        UserService::new(store(ctx)?)
            .me(caller(ctx))
            .await
            .map_err(AppError::into_graphql)
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        UserService::new(store(ctx)?)
            .user(arg_id(&id, "id")?)
            .await
            .map_err(AppError::into_graphql)
    }

    /// Every account. Administrators only.
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        UserService::new(store(ctx)?)
            .users(caller(ctx))
            .await
            .map_err(AppError::into_graphql)
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn register(&self, ctx: &Context<'_>, input: RegisterInput) -> Result<AuthPayload> {
        AuthService::new(store(ctx)?, tokens(ctx)?)
            .register(input.into())
            .await
            .map_err(|e| AppError::from(e).into_graphql())
    }

    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        AuthService::new(store(ctx)?, tokens(ctx)?)
            .login(&input.email, &input.password)
            .await
            .map_err(|e| AppError::from(e).into_graphql())
    }

    async fn update_user_role(&self, ctx: &Context<'_>, id: ID, role: Role) -> Result<User> {
        UserService::new(store(ctx)?)
            .update_user_role(caller(ctx), arg_id(&id, "id")?, role)
            .await
            .map_err(AppError::into_graphql)
    }
}
