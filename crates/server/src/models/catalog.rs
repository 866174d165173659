//! Catalog domain types: categories, products, and product images.

use serde::Serialize;

use shoplite_core::{CategoryId, ProductId, ProductImageId};

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Machine-friendly name.
    pub name: String,
    /// Display title.
    pub title: String,
}

/// A catalog product.
///
/// `available` is computed by the database from `amount` (a generated
/// column). The application never writes it; attempts to set it through the
/// update contract are dropped before they reach the repository.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning category, if any.
    pub category_id: Option<CategoryId>,
    /// Product name, unique across the catalog.
    pub name: String,
    /// Price in minor currency units.
    pub price: i32,
    /// Units in stock.
    pub amount: i32,
    /// Whether the product is in stock (`amount > 0`, store-computed).
    pub available: bool,
    /// Free-text description.
    pub description: Option<String>,
    /// Primary image URL, if set.
    pub image_url: Option<String>,
    /// Gallery images.
    pub images: Vec<ProductImage>,
}

/// An uploaded product image.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    /// Unique image ID.
    pub id: ProductImageId,
    /// Relative URL under the media mount.
    pub image_url: String,
}
