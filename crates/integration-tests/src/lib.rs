//! Integration tests for CraftCart.
//!
//! These drive a running `craftcart-api` over real HTTP and are marked
//! `#[ignore]` so a plain `cargo test` skips them.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the database and start the server
//! cargo run -p craftcart-cli -- migrate
//! cargo run -p craftcart-api
//!
//! # Run integration tests
//! cargo test -p craftcart-integration-tests -- --ignored
//! ```
//!
//! `CRAFTCART_API_URL` overrides the default `http://localhost:4000`.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL of the server under test.
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("CRAFTCART_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// A unique address so reruns never collide on the email constraint.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@craftcart.test", uuid::Uuid::new_v4().simple())
}

/// Thin GraphQL-over-HTTP client.
pub struct GraphqlClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphqlClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/graphql", api_base_url()),
            token: None,
        }
    }

    /// The same client, sending `token` as a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Post a query and return the decoded response body.
    ///
    /// # Errors
    ///
    /// Transport failures and non-JSON bodies.
    pub async fn query(&self, query: &str, variables: Value) -> reqwest::Result<Value> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await?.json().await
    }

    /// Register an account and return its token.
    ///
    /// # Errors
    ///
    /// Transport failures; a GraphQL error yields an empty token.
    pub async fn register(&self, name: &str, email: &str, role: &str) -> reqwest::Result<String> {
        let body = self
            .query(
                "mutation($input: RegisterInput!) { register(input: $input) { token } }",
                json!({
                    "input": {
                        "name": name,
                        "email": email,
                        "password": "password123",
                        "role": role
                    }
                }),
            )
            .await?;
        Ok(body["data"]["register"]["token"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}

impl Default for GraphqlClient {
    fn default() -> Self {
        Self::new()
    }
}
