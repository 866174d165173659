//! Domain types.
//!
//! These types represent validated domain objects separate from database
//! row types. They derive `Serialize` where they double as response bodies.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Category, Product, ProductImage};
pub use order::{NewOrderItem, Order, OrderItem};
pub use user::User;
