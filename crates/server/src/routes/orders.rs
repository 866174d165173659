//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use shoplite_core::{OrderId, OrderStatus, UserId};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalUser;
use crate::models::{NewOrderItem, Order, User};
use crate::state::AppState;

/// Fields for placing an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    /// Accepted for wire compatibility; ownership always comes from the
    /// session, never from the body.
    pub user_id: Option<i32>,
    pub items: Vec<NewOrderItem>,
    /// Initial status; defaults to `new`.
    pub status: Option<OrderStatus>,
}

/// Fields for updating an order. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    /// Full replacement for the item list.
    pub order_items: Option<Vec<NewOrderItem>>,
}

/// Decide order ownership: the session user, or nobody.
///
/// A `user_id` supplied in the body is ignored so a guest cannot attach an
/// order to an arbitrary account.
fn order_owner(session_user: Option<&User>, _requested: Option<i32>) -> Option<UserId> {
    session_user.map(|u| u.id)
}

/// Place an order.
///
/// Works for guests and authenticated users alike; a valid token binds the
/// order to that user regardless of any `user_id` in the body.
pub async fn create_order(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(body): Json<CreateOrder>,
) -> Result<impl IntoResponse> {
    for item in &body.items {
        if item.quantity < 1 {
            return Err(AppError::Validation(format!(
                "quantity for '{}' must be at least 1",
                item.product_name
            )));
        }
    }

    let user_id = order_owner(user.as_ref(), body.user_id);

    let order = OrderRepository::new(state.pool())
        .create(user_id, body.status.unwrap_or_default(), &body.items)
        .await?;

    tracing::info!(order_id = %order.id, items = order.items.len(), "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// List all orders.
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// Static status reference list consumed by the frontend's status picker.
pub async fn list_statuses() -> Json<serde_json::Value> {
    Json(json!([
        { "id": 1, "name": "New" },
        { "id": 2, "name": "Processing" },
        { "id": 3, "name": "Completed" },
    ]))
}

/// List one user's orders.
pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(UserId::new(id))
        .await?;

    Ok(Json(orders))
}

/// Get a single order.
pub async fn get_order(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order))
}

/// Update an order's status and/or replace its items.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateOrder>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update(OrderId::new(id), body.status, body.order_items.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order))
}

/// Delete an order.
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let deleted = OrderRepository::new(state.pool())
        .delete(OrderId::new(id))
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Order not found".to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shoplite_core::Email;

    use super::*;

    #[test]
    fn test_update_body_carries_order_items() {
        let body: UpdateOrder = serde_json::from_str(
            r#"{"status":"processing","order_items":[{"product_name":"Widget","quantity":2}]}"#,
        )
        .unwrap();

        assert_eq!(body.status, Some(OrderStatus::Processing));
        let items = body.order_items.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Widget");
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_create_body_carries_initial_status() {
        let body: CreateOrder = serde_json::from_str(
            r#"{"items":[{"product_name":"Widget","quantity":1}],"status":"pending"}"#,
        )
        .unwrap();
        assert_eq!(body.status, Some(OrderStatus::Pending));

        // Absent status falls back to the default
        let body: CreateOrder = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert_eq!(body.status.unwrap_or_default(), OrderStatus::New);
    }

    #[test]
    fn test_guest_cannot_claim_another_users_order() {
        assert_eq!(order_owner(None, Some(7)), None);

        let user = User {
            id: UserId::new(3),
            email: Email::parse("buyer@example.com").unwrap(),
        };
        assert_eq!(order_owner(Some(&user), Some(7)), Some(UserId::new(3)));
    }
}
