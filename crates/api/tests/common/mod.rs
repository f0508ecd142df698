//! Shared fixtures for the API test suites.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use async_graphql::{Request, Variables};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;

use craftcart_api::config::ServerConfig;
use craftcart_api::db::{MemoryStore, Store};
use craftcart_api::graphql::{CraftSchema, build_schema};
use craftcart_api::models::{Category, NewCategory, NewProduct, NewUser, Product, User};
use craftcart_api::services::TokenService;
use craftcart_core::{Email, Principal, Role};

pub const JWT_SECRET: &str = "k7Qm2vX9pL4wR8nT3jH6sB1cF5gD0zYa";

/// A schema over a fresh in-memory store.
pub struct TestApi {
    pub store: MemoryStore,
    pub tokens: TokenService,
    pub schema: CraftSchema,
}

impl TestApi {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let tokens = TokenService::new(&SecretString::from(JWT_SECRET), 24);
        let shared: Arc<dyn Store> = Arc::new(store.clone());
        let schema = build_schema(shared, tokens.clone());
        Self {
            store,
            tokens,
            schema,
        }
    }

    /// Run a query as `caller` and return the serialized response.
    pub async fn run(&self, query: &str, variables: Value, caller: Option<&Principal>) -> Value {
        let mut request = Request::new(query).variables(Variables::from_json(variables));
        if let Some(principal) = caller {
            request = request.data(principal.clone());
        }
        serde_json::to_value(self.schema.execute(request).await).unwrap()
    }

    /// Insert an account directly, skipping password hashing.
    pub async fn user(&self, name: &str, role: Role) -> (User, Principal) {
        let email = format!("{}@craftcart.test", name.to_lowercase());
        let user = self
            .store
            .insert_user(NewUser {
                name: name.to_string(),
                email: Email::parse(&email).unwrap(),
                password_hash: "x".to_string(),
                role,
                profile_image: None,
            })
            .await
            .unwrap();
        let principal = user.principal();
        (user, principal)
    }

    pub async fn category(&self, name: &str) -> Category {
        self.store
            .insert_category(NewCategory {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
    }

    pub async fn product(
        &self,
        artisan: &User,
        category: &Category,
        name: &str,
        cents: i64,
        quantity: i32,
    ) -> Product {
        self.store
            .insert_product(NewProduct {
                name: name.to_string(),
                description: format!("Handmade {name}"),
                price: Decimal::new(cents, 2),
                quantity,
                images: vec![],
                category_id: category.id,
                artisan_id: artisan.id,
            })
            .await
            .unwrap()
    }
}

/// The `extensions.code` of the first error, if any.
pub fn error_code(response: &Value) -> Option<&str> {
    response["errors"][0]["extensions"]["code"].as_str()
}

pub fn error_message(response: &Value) -> Option<&str> {
    response["errors"][0]["message"].as_str()
}

pub fn assert_ok(response: &Value) {
    assert!(
        response.get("errors").is_none_or(Value::is_null),
        "unexpected errors: {response}"
    );
}

/// Server configuration pointing at temporary directories.
pub fn config(uploads_dir: &Path, public_dir: &Path) -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        jwt_secret: SecretString::from(JWT_SECRET),
        token_ttl_hours: 24,
        uploads_dir: uploads_dir.to_path_buf(),
        public_dir: public_dir.to_path_buf(),
        allowed_origins: vec!["http://localhost:3999".to_string()],
        max_upload_bytes: 1024 * 1024,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
