//! HTTP routes for the API server.
//!
//! # Route Structure
//!
//! ```text
//! POST /graphql        - GraphQL endpoint (bearer token optional)
//! GET  /graphql        - GraphiQL explorer
//! POST /upload         - Multipart image upload (field "image")
//! GET  /uploads/*      - Uploaded files
//! GET  /health         - Liveness check
//! GET  /health/ready   - Readiness check (store ping)
//! GET  /*              - Frontend bundle, falling back to index.html
//! ```

pub mod graphql;
pub mod health;
pub mod upload;

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    },
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the full application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let config = state.config();
    let uploads = ServeDir::new(&config.uploads_dir);
    let frontend = ServeDir::new(&config.public_dir)
        .fallback(ServeFile::new(config.public_dir.join("index.html")));
    let cors = cors_layer(&config.allowed_origins);
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);

    Router::new()
        .route(
            graphql::GRAPHQL_PATH,
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .route("/upload", post(upload::upload).layer(body_limit))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest_service(upload::UPLOADS_PATH, uploads)
        .fallback_service(frontend)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS restricted to `origins`, with credentials and the Authorization header.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}
