//! Product route handlers, including image upload and serving.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use shoplite_core::{CategoryId, ProductId, ProductImageId};

use crate::db::catalog::{CatalogRepository, NewProduct, ProductPatch};
use crate::error::{AppError, Result};
use crate::models::{Product, ProductImage};
use crate::services::media;
use crate::state::AppState;

/// Fields for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub category_id: Option<i32>,
    pub name: String,
    pub price: i32,
    pub amount: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update for a product. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub category_id: Option<i32>,
    pub name: Option<String>,
    pub price: Option<i32>,
    pub amount: Option<i32>,
    /// Accepted for wire compatibility but ignored; availability is derived
    /// from `amount` by the store.
    pub available: Option<bool>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// List all products.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = CatalogRepository::new(state.pool()).list_products().await?;
    Ok(Json(products))
}

/// Create a new product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProduct>,
) -> Result<impl IntoResponse> {
    let input = NewProduct {
        category_id: body.category_id.map(CategoryId::new),
        name: body.name,
        price: body.price,
        amount: body.amount,
        description: body.description,
        image_url: body.image_url,
    };

    let product = CatalogRepository::new(state.pool()).create_product(&input).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a single product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = CatalogRepository::new(state.pool())
        .get_product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product))
}

/// Partially update a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    let patch = ProductPatch {
        category_id: body.category_id.map(CategoryId::new),
        name: body.name,
        price: body.price,
        amount: body.amount,
        description: body.description,
        image_url: body.image_url,
    };

    let product = CatalogRepository::new(state.pool())
        .update_product(ProductId::new(id), &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product))
}

/// Delete a product together with its uploaded image files.
///
/// Unconditional: deleting a product that does not exist still reports
/// success.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let image_urls = CatalogRepository::new(state.pool())
        .delete_product(ProductId::new(id))
        .await?;

    // Rows are already gone; file removal failures only leave orphans
    for url in image_urls {
        if let Err(e) = state.media().delete_by_url(&url).await {
            tracing::warn!(url, error = %e, "failed to remove image file");
        }
    }

    Ok(Json(json!({ "detail": "Product deleted" })))
}

/// Upload a product image via multipart form data.
///
/// Expects a single part named `file`. The upload is stored on disk and
/// recorded against the product.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let repo = CatalogRepository::new(state.pool());

    if repo.get_product(id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        let stored = state
            .media()
            .save(&original_name, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

        let image = repo.create_image(id, &stored.url).await?;

        tracing::info!(product_id = %id, url = %stored.url, "image uploaded");

        return Ok((StatusCode::CREATED, Json(image)));
    }

    Err(AppError::BadRequest("missing 'file' field".to_owned()))
}

/// List a product's images.
///
/// Responds 404 when the product has no images, matching the frontend's
/// expectation that an empty gallery is an error.
pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProductImage>>> {
    let images = CatalogRepository::new(state.pool())
        .list_images(ProductId::new(id))
        .await?;

    if images.is_empty() {
        return Err(AppError::NotFound("Images not found".to_owned()));
    }

    Ok(Json(images))
}

/// Delete one product image row and its backing file.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let id = ProductImageId::new(id);
    let repo = CatalogRepository::new(state.pool());

    let image = repo
        .get_image(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_owned()))?;

    if let Err(e) = state.media().delete_by_url(&image.image_url).await {
        tracing::warn!(url = %image.image_url, error = %e, "failed to remove image file");
    }

    repo.delete_image(id).await?;

    Ok(Json(json!({ "detail": "Image deleted" })))
}

/// Serve an uploaded product image.
pub async fn serve_media(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    let path = state
        .media()
        .path_for(&filename)
        .ok_or_else(|| AppError::NotFound("File not found".to_owned()))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_owned()));
        }
        Err(e) => return Err(AppError::Internal(format!("failed to read file: {e}"))),
    };

    let content_type = media::content_type_for(&filename);

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_accepts_available_but_patch_has_no_slot_for_it() {
        let body: UpdateProduct =
            serde_json::from_str(r#"{"amount": 0, "available": true}"#).unwrap();
        assert_eq!(body.available, Some(true));

        // The patch passed to the repository carries everything except
        // `available`; the stored value is regenerated from `amount`.
        let patch = ProductPatch {
            amount: body.amount,
            ..ProductPatch::default()
        };
        assert_eq!(patch.amount, Some(0));
    }

    #[test]
    fn test_update_with_absent_fields() {
        let body: UpdateProduct = serde_json::from_str("{}").unwrap();
        assert!(body.name.is_none());
        assert!(body.price.is_none());
        assert!(body.available.is_none());
    }
}
