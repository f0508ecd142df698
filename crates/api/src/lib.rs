//! CraftCart API library.
//!
//! The marketplace server as a library, so the router, schema and services
//! can be driven directly from tests and from the CLI.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - Storage seam (`PostgreSQL` and in-memory)
//! - [`services`] - Business logic behind every operation
//! - [`loaders`] - Relation loaders used by GraphQL fields
//! - [`graphql`] - Schema, resolvers and input/output types
//! - [`routes`] - HTTP router (GraphQL, uploads, static files, health)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod loaders;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
