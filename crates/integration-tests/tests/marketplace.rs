//! End-to-end marketplace flows over HTTP.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`craftcart migrate`, `craftcart seed`)
//! - The API server running (`cargo run -p craftcart-api`)
//!
//! Run with: cargo test -p craftcart-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use craftcart_integration_tests::{GraphqlClient, api_base_url, unique_email};

async fn first_category_id(client: &GraphqlClient) -> String {
    let body = client.query("{ categories { id } }", json!({})).await.unwrap();
    body["data"]["categories"][0]["id"]
        .as_str()
        .expect("seeded database has at least one category")
        .to_string()
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_health() {
    let response = Client::new()
        .get(format!("{}/health", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_seeded_catalog_is_browsable() {
    let client = GraphqlClient::new();
    let body = client
        .query(
            "{ featuredProducts { name price category { name } artisan { name } } }",
            json!({}),
        )
        .await
        .unwrap();

    let products = body["data"]["featuredProducts"].as_array().unwrap();
    assert!(!products.is_empty());
    assert!(products.len() <= 5);
    assert!(products.iter().all(|p| p["price"].as_f64().unwrap() > 0.0));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_artisan_lists_and_buyer_orders() {
    let anonymous = GraphqlClient::new();
    let category_id = first_category_id(&anonymous).await;

    let artisan_token = anonymous
        .register("Integration Artisan", &unique_email("artisan"), "ARTISAN")
        .await
        .unwrap();
    let buyer_token = anonymous
        .register("Integration Buyer", &unique_email("buyer"), "BUYER")
        .await
        .unwrap();
    let artisan = GraphqlClient::new().with_token(artisan_token);
    let buyer = GraphqlClient::new().with_token(buyer_token);

    let created = artisan
        .query(
            "mutation($input: ProductInput!) { createProduct(input: $input) { id quantity } }",
            json!({
                "input": {
                    "name": "Integration Vase",
                    "description": "Thrown on a wheel",
                    "price": 40.0,
                    "quantity": 3,
                    "categoryId": category_id
                }
            }),
        )
        .await
        .unwrap();
    let product_id = created["data"]["createProduct"]["id"].as_str().unwrap().to_string();

    let cart = buyer
        .query(
            "mutation($id: ID!) { addToCart(productId: $id, quantity: 2) { totalItems subtotal } }",
            json!({ "id": product_id }),
        )
        .await
        .unwrap();
    assert_eq!(cart["data"]["addToCart"]["totalItems"], 2);
    assert_eq!(cart["data"]["addToCart"]["subtotal"], 80.0);

    let order = buyer
        .query(
            "mutation($items: [OrderItemInput!]!) { createOrder(items: $items) { status total } }",
            json!({ "items": [{ "product": product_id, "quantity": 2 }] }),
        )
        .await
        .unwrap();
    assert_eq!(order["data"]["createOrder"]["status"], "PENDING");
    assert_eq!(order["data"]["createOrder"]["total"], 80.0);

    let oversold: Value = buyer
        .query(
            "mutation($items: [OrderItemInput!]!) { createOrder(items: $items) { id } }",
            json!({ "items": [{ "product": product_id, "quantity": 2 }] }),
        )
        .await
        .unwrap();
    assert_eq!(oversold["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");

    let remaining = anonymous
        .query(
            "query($id: ID!) { product(id: $id) { quantity } }",
            json!({ "id": product_id }),
        )
        .await
        .unwrap();
    assert_eq!(remaining["data"]["product"]["quantity"], 1);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_upload_round_trip() {
    let form = reqwest::multipart::Form::new().part(
        "image",
        reqwest::multipart::Part::bytes(b"\x89PNG integration".to_vec()).file_name("vase.png"),
    );
    let response = Client::new()
        .post(format!("{}/upload", api_base_url()))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/image-"));

    let served = Client::new()
        .get(format!("{}{url}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"\x89PNG integration");
}
