//! Payment route handlers.
//!
//! The provider calls `callback` with the payment result as form data and
//! expects a redirect it can send the customer's browser through. See the
//! security note in `crate::payments` about callback authenticity.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use serde_json::json;

use shoplite_core::{OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Form data posted by the payment provider.
#[derive(Debug, Deserialize)]
pub struct CallbackForm {
    pub orderid: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for the post-payment result pages.
#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub order_id: i32,
}

/// Fields for requesting a checkout URL.
#[derive(Debug, Deserialize)]
pub struct CreateLink {
    pub order_id: i32,
    pub amount: f64,
    pub client_email: String,
    pub client_phone: String,
}

/// Request a checkout URL for an existing order.
pub async fn create_link(
    State(state): State<AppState>,
    Json(body): Json<CreateLink>,
) -> Result<Json<serde_json::Value>> {
    let order_id = OrderId::new(body.order_id);

    OrderRepository::new(state.pool())
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let invoice_url = state
        .payments()
        .create_payment_link(order_id, body.amount, &body.client_email, &body.client_phone)
        .await?;

    Ok(Json(json!({ "invoice_url": invoice_url })))
}

/// Handle the provider's payment result callback.
///
/// Marks the order paid on a `success` status and cancelled otherwise,
/// then redirects the customer to the frontend result page.
pub async fn callback(
    State(state): State<AppState>,
    Form(form): Form<CallbackForm>,
) -> Result<impl IntoResponse> {
    let orderid = form
        .orderid
        .ok_or_else(|| AppError::BadRequest("orderid is required".to_owned()))?;
    let order_id: i32 = orderid
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid orderid: '{orderid}'")))?;
    let order_id = OrderId::new(order_id);

    let repo = OrderRepository::new(state.pool());
    repo.get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let new_status = status_from_callback(form.status.as_deref());
    let succeeded = new_status == OrderStatus::Paid;

    repo.update(order_id, Some(new_status), None).await?;

    tracing::info!(order_id = %order_id, status = %new_status, "payment callback processed");

    let frontend = &state.config().payments.frontend_url;
    let target = if succeeded {
        format!("{frontend}/payment/success?order_id={order_id}")
    } else {
        format!("{frontend}/payment/fail?order_id={order_id}")
    };

    Ok(Redirect::to(&target))
}

/// Map the provider's status field to an order status.
///
/// Only the literal `success` marks the order paid; anything else, absent
/// or misspelled, cancels it.
fn status_from_callback(status: Option<&str>) -> OrderStatus {
    if status == Some("success") {
        OrderStatus::Paid
    } else {
        OrderStatus::Cancelled
    }
}

/// Confirmation data for a completed payment.
pub async fn success(
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<Json<serde_json::Value>> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(query.order_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let email = order.user.as_ref().map(|u| u.email.as_str().to_owned());

    Ok(Json(json!({
        "order_id": order.id,
        "email": email,
        "status": order.status,
        "message": "Payment completed successfully",
    })))
}

/// Result data for a failed or cancelled payment.
///
/// Tolerates an order that no longer exists; the frontend only needs the id
/// it asked about echoed back.
pub async fn fail(
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<Json<serde_json::Value>> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(query.order_id))
        .await?;

    let order_id = order.as_ref().map_or(query.order_id, |o| o.id.as_i32());

    Ok(Json(json!({
        "order_id": order_id,
        "status": OrderStatus::Cancelled,
        "message": "Payment failed or was cancelled",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_callback_success_literal() {
        assert_eq!(status_from_callback(Some("success")), OrderStatus::Paid);
    }

    #[test]
    fn test_status_from_callback_anything_else_cancels() {
        assert_eq!(status_from_callback(None), OrderStatus::Cancelled);
        assert_eq!(status_from_callback(Some("failed")), OrderStatus::Cancelled);
        assert_eq!(status_from_callback(Some("SUCCESS")), OrderStatus::Cancelled);
        assert_eq!(status_from_callback(Some("")), OrderStatus::Cancelled);
    }
}
