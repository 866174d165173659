//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database ping)
//!
//! # Auth
//! POST /auth/register           - Create an account
//! POST /auth/login              - Login, sets the access_token cookie
//! POST /auth/logout             - Clear the access_token cookie
//! GET  /auth/me                 - Current user (cookie or bearer token)
//! GET  /auth/check              - Cookie-only session probe, never 401s
//!
//! # Catalog
//! GET  /categories              - List categories
//! POST /categories              - Create a category
//! GET  /products                - List products with images
//! POST /products                - Create a product
//! GET  /products/{id}           - Product detail
//! PATCH /products/{id}          - Partial update
//! DELETE /products/{id}         - Delete product and its image files
//! POST /products/{id}/upload-image - Multipart image upload
//! GET  /products/{id}/images    - List product images (404 when empty)
//! DELETE /products/images/{id}  - Delete one image row and its file
//! GET  /products/media/products/{filename} - Serve an uploaded image
//! (static files are additionally mounted at /media)
//!
//! # Orders
//! POST /orders                  - Place an order (guest or authenticated)
//! GET  /orders                  - List all orders
//! GET  /orders/statuses         - Static status reference list
//! GET  /orders/user/{id}        - One user's orders
//! GET  /orders/{id}             - Order detail
//! PUT  /orders/{id}             - Update status and/or replace items
//! DELETE /orders/{id}           - Delete an order
//!
//! # Payments
//! POST /payments/link           - Request a provider checkout URL
//! POST /payments/callback       - Provider result callback (redirects)
//! GET  /payments/success        - Post-payment confirmation data
//! GET  /payments/fail           - Post-payment failure data
//! ```

pub mod auth;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/check", get(auth::check))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(categories::list_categories).post(categories::create_category),
    )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list_products).post(products::create_product))
        .route(
            "/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route("/{id}/upload-image", post(products::upload_image))
        .route("/{id}/images", get(products::list_images))
        .route("/images/{id}", delete(products::delete_image))
        .route("/media/products/{filename}", get(products::serve_media))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route("/statuses", get(orders::list_statuses))
        .route("/user/{id}", get(orders::list_user_orders))
        .route(
            "/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/link", post(payments::create_link))
        .route("/callback", post(payments::callback))
        .route("/success", get(payments::success))
        .route("/fail", get(payments::fail))
}

/// Assemble the full application router (no global layers).
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/payments", payment_routes())
}
