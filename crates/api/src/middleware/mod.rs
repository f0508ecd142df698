//! HTTP middleware stack for the API server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (configured origin allow-list)
//!
//! Authentication is not a layer: handlers pull the caller through the
//! [`Session`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::{Session, principal_from_headers};
pub use request_id::request_id_middleware;
