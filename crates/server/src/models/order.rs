//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoplite_core::{OrderId, OrderItemId, OrderStatus, UserId};

use super::catalog::Product;
use super::user::User;

/// A customer order with its line items eagerly loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user; `None` for guest checkout.
    pub user_id: Option<UserId>,
    /// Store-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Line items with their resolved products.
    pub items: Vec<OrderItem>,
    /// Owning user record, loaded for single-order reads.
    #[serde(skip)]
    pub user: Option<User>,
}

/// A line item within an order.
///
/// Items reference products by name. A name with no matching product
/// resolves to `product: None` rather than failing the read.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    /// Unique line item ID.
    pub id: OrderItemId,
    /// Referenced product name.
    pub product_name: String,
    /// Ordered quantity.
    pub quantity: i32,
    /// Resolved product, if one with that name exists.
    pub product: Option<Product>,
}

/// Input for a line item at order creation or replacement.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    /// Referenced product name.
    pub product_name: String,
    /// Ordered quantity.
    pub quantity: i32,
}
