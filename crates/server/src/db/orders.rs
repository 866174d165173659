//! Order repository.
//!
//! Reads return fully populated orders: line items, each item's product
//! resolved by name, and (for single-order reads) the owning user. The
//! population is done with batched lookups rather than one wide join, so
//! each order appears exactly once regardless of item count.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use shoplite_core::{CategoryId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use super::catalog::CatalogRepository;
use super::users::UserRepository;
use crate::models::{NewOrderItem, Order, OrderItem, Product};

#[derive(FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    created_at: DateTime<Utc>,
    status: OrderStatus,
}

/// Line item joined with its (possibly missing) product.
#[derive(FromRow)]
struct ItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_name: String,
    quantity: i32,
    #[sqlx(rename = "p_id")]
    product_id: Option<ProductId>,
    #[sqlx(rename = "p_category_id")]
    category_id: Option<CategoryId>,
    #[sqlx(rename = "p_price")]
    price: Option<i32>,
    #[sqlx(rename = "p_amount")]
    amount: Option<i32>,
    #[sqlx(rename = "p_available")]
    available: Option<bool>,
    #[sqlx(rename = "p_description")]
    description: Option<String>,
    #[sqlx(rename = "p_image_url")]
    image_url: Option<String>,
}

impl ItemRow {
    fn into_item(self) -> OrderItem {
        let product = match (self.product_id, self.price, self.amount, self.available) {
            (Some(id), Some(price), Some(amount), Some(available)) => Some(Product {
                id,
                category_id: self.category_id,
                name: self.product_name.clone(),
                price,
                amount,
                available,
                description: self.description,
                image_url: self.image_url,
                images: Vec::new(),
            }),
            _ => None,
        };

        OrderItem {
            id: self.id,
            product_name: self.product_name,
            quantity: self.quantity,
            product,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its line items in one transaction, then re-read
    /// it fully populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; the
    /// transaction rolls back and nothing is persisted.
    pub async fn create(
        &self,
        user_id: Option<UserId>,
        status: OrderStatus,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_id,): (OrderId,) = sqlx::query_as(
            r"
            INSERT INTO orders (user_id, status)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_name, quantity)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(order_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(order_id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Get a single order, populated with items, products, and owning user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, created_at, status
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = self.load_items(&[row.id.as_i32()]).await?;
        let user = match row.user_id {
            Some(user_id) => UserRepository::new(self.pool).get_by_id(user_id).await?,
            None => None,
        };

        Ok(Some(Order {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            status: row.status,
            items: items.remove(&row.id.as_i32()).unwrap_or_default(),
            user,
        }))
    }

    /// List all orders, populated with items and products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, created_at, status
            FROM orders
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// List one user's orders, populated with items and products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, created_at, status
            FROM orders
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Apply a partial update: a new status and/or a replacement item list.
    ///
    /// Replacing items deletes the existing rows and inserts the new ones in
    /// the same transaction. Returns the populated order, or `None` if it
    /// doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails.
    pub async fn update(
        &self,
        id: OrderId,
        status: Option<OrderStatus>,
        items: Option<&[NewOrderItem]>,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        if let Some(status) = status {
            sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(items) = items {
            sqlx::query("DELETE FROM order_items WHERE order_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for item in items {
                sqlx::query(
                    r"
                    INSERT INTO order_items (order_id, product_name, quantity)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(id)
                .bind(&item.product_name)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get(id).await
    }

    /// Delete an order and its items.
    ///
    /// Returns `true` if an order existed and was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let mut items = self.load_items(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| Order {
                id: row.id,
                user_id: row.user_id,
                created_at: row.created_at,
                status: row.status,
                items: items.remove(&row.id.as_i32()).unwrap_or_default(),
                user: None,
            })
            .collect())
    }

    /// Load line items for a set of orders, grouped by order id, with each
    /// item's product (and its images) resolved by name.
    async fn load_items(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.id, i.order_id, i.product_name, i.quantity,
                   p.id AS p_id,
                   p.category_id AS p_category_id,
                   p.price AS p_price,
                   p.amount AS p_amount,
                   p.available AS p_available,
                   p.description AS p_description,
                   p.image_url AS p_image_url
            FROM order_items i
            LEFT JOIN products p ON p.name = i.product_name
            WHERE i.order_id = ANY($1)
            ORDER BY i.id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let product_ids: Vec<i32> = rows
            .iter()
            .filter_map(|r| r.product_id.map(|id| id.as_i32()))
            .collect();
        let images = CatalogRepository::new(self.pool)
            .load_images_for(&product_ids)
            .await?;

        let mut grouped: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id.as_i32();
            let mut item = row.into_item();
            if let Some(product) = item.product.as_mut() {
                // cloned: two items can reference the same product
                product.images = images.get(&product.id.as_i32()).cloned().unwrap_or_default();
            }
            grouped.entry(order_id).or_default().push(item);
        }

        Ok(grouped)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unresolved_row() -> ItemRow {
        ItemRow {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_name: "Ghost".to_owned(),
            quantity: 2,
            product_id: None,
            category_id: None,
            price: None,
            amount: None,
            available: None,
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn test_item_with_missing_product_resolves_to_none() {
        let item = unresolved_row().into_item();

        assert!(item.product.is_none());
        assert_eq!(item.product_name, "Ghost");
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_item_with_matching_product_resolves() {
        let mut row = unresolved_row();
        row.product_name = "Widget".to_owned();
        row.product_id = Some(ProductId::new(9));
        row.price = Some(500);
        row.amount = Some(3);
        row.available = Some(true);

        let item = row.into_item();
        let product = item.product.unwrap();
        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.name, "Widget");
        assert!(product.available);
        assert!(product.images.is_empty());
    }
}
