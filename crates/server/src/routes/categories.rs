//! Category route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::db::catalog::CatalogRepository;
use crate::error::Result;
use crate::models::Category;
use crate::state::AppState;

/// Fields for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub title: String,
}

/// List all categories.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(Json(categories))
}

/// Create a new category.
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategory>,
) -> Result<impl IntoResponse> {
    let category = CatalogRepository::new(state.pool())
        .create_category(&body.name, &body.title)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}
