//! Business logic services.
//!
//! Each service borrows the [`Store`](crate::db::Store) and takes the caller
//! as `Option<&Principal>`. The policy table is consulted first thing in
//! every operation, before any state is read or written.
//!
//! # Services
//!
//! - `auth` - Registration and login (argon2 + session tokens)
//! - `users` - Account queries and role changes
//! - `catalog` - Categories and products
//! - `cart` - Per-user carts
//! - `orders` - Transactional checkout and order administration
//! - `reviews` - One review per product and user
//! - `audit` - Best-effort administrator audit trail
//! - `token` - Session token signing and verification

pub mod audit;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod reviews;
pub mod token;
pub mod users;

pub use auth::{AuthError, AuthPayload, AuthService, Registration};
pub use cart::CartService;
pub use catalog::{CatalogService, CategoryInput, CategoryUpdate, ProductInput, ProductUpdate};
pub use orders::OrderService;
pub use reviews::{ReviewInput, ReviewService, ReviewUpdate};
pub use token::{TokenError, TokenService};
pub use users::UserService;
