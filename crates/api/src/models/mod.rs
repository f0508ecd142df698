//! Domain models for the marketplace.
//!
//! These are validated domain objects, separate from database row types.

pub mod admin_log;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;
pub mod user;

pub use admin_log::{AdminLog, NewAdminLog};
pub use cart::Cart;
pub use catalog::{Category, CategoryPatch, NewCategory, NewProduct, Product, ProductFilter, ProductPatch};
pub use order::{NewOrder, Order};
pub use review::{NewReview, Review, ReviewPatch};
pub use user::{NewUser, User};
