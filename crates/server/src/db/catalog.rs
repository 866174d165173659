//! Catalog repository: categories, products, and product images.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use shoplite_core::{CategoryId, ProductId, ProductImageId};

use super::RepositoryError;
use crate::models::{Category, Product, ProductImage};

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, price, amount, available, description, image_url";

#[derive(FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    title: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            title: row.title,
        }
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: ProductId,
    category_id: Option<CategoryId>,
    name: String,
    price: i32,
    amount: i32,
    available: bool,
    description: Option<String>,
    image_url: Option<String>,
}

impl ProductRow {
    fn into_product(self, images: Vec<ProductImage>) -> Product {
        Product {
            id: self.id,
            category_id: self.category_id,
            name: self.name,
            price: self.price,
            amount: self.amount,
            available: self.available,
            description: self.description,
            image_url: self.image_url,
            images,
        }
    }
}

#[derive(FromRow)]
struct ImageRow {
    id: ProductImageId,
    product_id: ProductId,
    image_url: String,
}

/// Fields for creating a product.
///
/// `available` is intentionally absent: the column is generated by the store.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub price: i32,
    pub amount: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update for a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub price: Option<i32>,
    pub amount: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Insert a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_category(
        &self,
        name: &str,
        title: &str,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO categories (name, title)
            VALUES ($1, $2)
            RETURNING id, name, title
            ",
        )
        .bind(name)
        .bind(title)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, title
            FROM categories
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (category_id, name, price, amount, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.amount)
        .bind(&input.description)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| Self::map_name_conflict(e, &input.name))?;

        Ok(row.into_product(Vec::new()))
    }

    /// List all products with their images attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            ORDER BY id
            "
        ))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let mut images = self.load_images_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let imgs = images.remove(&r.id.as_i32()).unwrap_or_default();
                r.into_product(imgs)
            })
            .collect())
    }

    /// Get a single product with its images, or `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let images = self.list_images(row.id).await?;
        Ok(Some(row.into_product(images)))
    }

    /// Apply a partial update to a product.
    ///
    /// Only fields present in the patch are written. The `available` column
    /// is never touched; it is regenerated by the store from `amount`.
    /// A nullable field can be changed but not cleared: the patch carries
    /// no way to write NULL over an existing value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a product name collision.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let name_for_conflict = patch.name.clone().unwrap_or_default();

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products SET
                category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                price = COALESCE($4, price),
                amount = COALESCE($5, amount),
                description = COALESCE($6, description),
                image_url = COALESCE($7, image_url)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.category_id)
        .bind(&patch.name)
        .bind(patch.price)
        .bind(patch.amount)
        .bind(&patch.description)
        .bind(&patch.image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| Self::map_name_conflict(e, &name_for_conflict))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let images = self.list_images(row.id).await?;
        Ok(Some(row.into_product(images)))
    }

    /// Delete a product.
    ///
    /// Image rows cascade in the store; the URLs of the cascaded images are
    /// returned so the caller can remove the underlying files.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_product(&self, id: ProductId) -> Result<Vec<String>, RepositoryError> {
        let urls: Vec<(String,)> = sqlx::query_as(
            r"
            SELECT image_url
            FROM product_images
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(urls.into_iter().map(|(url,)| url).collect())
    }

    // =========================================================================
    // Product images
    // =========================================================================

    /// List all images for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ImageRow>(
            r"
            SELECT id, product_id, image_url
            FROM product_images
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductImage {
                id: r.id,
                image_url: r.image_url,
            })
            .collect())
    }

    /// Record an uploaded image for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_image(
        &self,
        product_id: ProductId,
        image_url: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let row = sqlx::query_as::<_, ImageRow>(
            r"
            INSERT INTO product_images (product_id, image_url)
            VALUES ($1, $2)
            RETURNING id, product_id, image_url
            ",
        )
        .bind(product_id)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductImage {
            id: row.id,
            image_url: row.image_url,
        })
    }

    /// Get an image row, or `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_image(
        &self,
        id: ProductImageId,
    ) -> Result<Option<ProductImage>, RepositoryError> {
        let row = sqlx::query_as::<_, ImageRow>(
            r"
            SELECT id, product_id, image_url
            FROM product_images
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| ProductImage {
            id: r.id,
            image_url: r.image_url,
        }))
    }

    /// Delete an image row.
    ///
    /// Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_image(&self, id: ProductImageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_images WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Load images for a set of products, grouped by product id.
    pub(crate) async fn load_images_for(
        &self,
        product_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ProductImage>>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ImageRow>(
            r"
            SELECT id, product_id, image_url
            FROM product_images
            WHERE product_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<ProductImage>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.product_id.as_i32())
                .or_default()
                .push(ProductImage {
                    id: row.id,
                    image_url: row.image_url,
                });
        }

        Ok(grouped)
    }

    fn map_name_conflict(e: sqlx::Error, name: &str) -> RepositoryError {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(format!("product named '{name}' already exists"));
        }
        RepositoryError::Database(e)
    }
}
