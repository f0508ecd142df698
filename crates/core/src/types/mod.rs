//! Core types for CraftCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod principal;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use principal::Principal;
pub use status::*;
