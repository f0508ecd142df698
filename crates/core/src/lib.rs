//! CraftCart Core - Shared domain types and rules.
//!
//! This crate holds everything about the marketplace that does not touch I/O:
//! - `api` - GraphQL server, storage and HTTP surface
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no database access, no
//! HTTP, no clocks. Storage and transport adapters live in `craftcart-api`.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, roles, order statuses, money helpers, principals
//! - [`policy`] - The authorization policy table
//! - [`cart`] - Cart line rules and derived totals
//! - [`order`] - Checkout request checks and priced order lines
//! - [`validation`] - Mutation input validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod policy;
pub mod types;
pub mod validation;

pub use policy::{AccessError, Operation};
pub use types::*;
