//! Payment provider client.
//!
//! Posts invoice requests to the configured provider endpoint and extracts
//! the provider-issued checkout URL from the JSON response.
//!
//! # Security
//!
//! The inbound callback handled in `routes::payments` carries NO signature
//! and is not verified to originate from the provider. This mirrors the
//! behavior of the system this one replaces and is unsafe for production
//! use; anyone who can reach the callback endpoint can mark orders paid.

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use shoplite_core::OrderId;

use crate::config::PaymentConfig;

/// Errors from the payment provider client.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Request failed or the provider returned an error status.
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider response did not contain a checkout URL.
    #[error("payment provider response missing invoice_url")]
    MissingInvoiceUrl,
}

/// Form payload posted to the provider's invoice endpoint.
#[derive(Debug, Serialize)]
struct InvoiceRequest<'a> {
    clientid: String,
    orderid: String,
    sum: String,
    service_name: &'static str,
    client_email: &'a str,
    client_phone: &'a str,
    success_url: &'a str,
    fail_url: &'a str,
}

impl<'a> InvoiceRequest<'a> {
    fn new(order_id: OrderId, amount: f64, email: &'a str, phone: &'a str, config: &'a PaymentConfig) -> Self {
        Self {
            clientid: format!("order-{order_id}"),
            orderid: order_id.to_string(),
            sum: amount.to_string(),
            service_name: "Order payment",
            client_email: email,
            client_phone: phone,
            success_url: &config.success_url,
            fail_url: &config.fail_url,
        }
    }
}

/// Client for the third-party payment provider.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    http: Client,
    config: PaymentConfig,
}

impl PaymentClient {
    /// Create a new payment client.
    #[must_use]
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// The payment configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &PaymentConfig {
        &self.config
    }

    /// Request a checkout URL for an order from the provider.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the request fails or the provider
    /// responds with an error status, and `PaymentError::MissingInvoiceUrl`
    /// if the response body lacks the checkout URL.
    pub async fn create_payment_link(
        &self,
        order_id: OrderId,
        amount: f64,
        client_email: &str,
        client_phone: &str,
    ) -> Result<String, PaymentError> {
        let payload = InvoiceRequest::new(order_id, amount, client_email, client_phone, &self.config);

        tracing::debug!(order_id = %order_id, "requesting payment link");

        let response = self
            .http
            .post(&self.config.provider_url)
            .form(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        extract_invoice_url(&body)
    }
}

/// Pull the checkout URL out of a provider response body.
fn extract_invoice_url(body: &serde_json::Value) -> Result<String, PaymentError> {
    body.get("invoice_url")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or(PaymentError::MissingInvoiceUrl)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn test_config() -> PaymentConfig {
        PaymentConfig {
            provider_url: "https://demo.paykeeper.ru/create/".to_string(),
            success_url: "http://localhost:5173/checkout/success".to_string(),
            fail_url: "http://localhost:5173/checkout/fail".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }

    #[test]
    fn test_invoice_request_fields() {
        let config = test_config();
        let payload = InvoiceRequest::new(
            OrderId::new(17),
            1250.0,
            "buyer@example.com",
            "+10000000000",
            &config,
        );

        assert_eq!(payload.clientid, "order-17");
        assert_eq!(payload.orderid, "17");
        assert_eq!(payload.sum, "1250");
        assert_eq!(payload.success_url, config.success_url);
        assert_eq!(payload.fail_url, config.fail_url);

        // Serializes as flat form fields
        let encoded = serde_urlencoded::to_string(&payload).unwrap();
        assert!(encoded.contains("orderid=17"));
        assert!(encoded.contains("client_email=buyer%40example.com"));
    }

    #[test]
    fn test_extract_invoice_url() {
        let body = json!({"invoice_id": "abc", "invoice_url": "https://pay.example/i/abc"});
        assert_eq!(
            extract_invoice_url(&body).unwrap(),
            "https://pay.example/i/abc"
        );
    }

    #[test]
    fn test_extract_invoice_url_missing() {
        assert!(matches!(
            extract_invoice_url(&json!({"invoice_id": "abc"})),
            Err(PaymentError::MissingInvoiceUrl)
        ));
        assert!(matches!(
            extract_invoice_url(&json!({"invoice_url": 5})),
            Err(PaymentError::MissingInvoiceUrl)
        ));
    }
}
