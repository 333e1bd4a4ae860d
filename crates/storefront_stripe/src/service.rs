use reqwest::Client;
use serde::Deserialize;
use storefront_common::services::{
    BoxFuture, CheckoutSessionRequest, CheckoutSessionResult, PaymentService,
};
use storefront_common::HTTP_CLIENT;
use storefront_config::{resolved_secret, StripeConfig};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::StripeError;

#[derive(Deserialize, Debug)]
struct StripeCheckoutSessionApiResponse {
    pub id: String,
    pub url: Option<String>,
}

/// Stripe payment service implementation
pub struct StripePaymentService {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripePaymentService {
    /// Create a new Stripe payment service; fails when the secret key was never resolved.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let secret_key = resolved_secret(&config.secret_key)
            .ok_or_else(|| StripeError::ConfigError("STRIPE_SECRET_KEY is not set".to_string()))?;
        Ok(Self::with_client(HTTP_CLIENT.clone(), &config.api_base, secret_key))
    }

    pub fn with_client(client: Client, api_base: &str, secret_key: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

/// Encodes a session request with Stripe's bracketed form keys.
pub fn checkout_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form_body: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    for (i, method) in request.payment_method_types.iter().enumerate() {
        form_body.push((format!("payment_method_types[{i}]"), method.clone()));
    }
    for (i, item) in request.line_items.iter().enumerate() {
        form_body.push((
            format!("line_items[{i}][price_data][currency]"),
            request.currency.clone(),
        ));
        form_body.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        form_body.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form_body.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
    }
    if let Some(email) = &request.customer_email {
        form_body.push(("customer_email".to_string(), email.clone()));
    }
    for (key, value) in &request.metadata {
        form_body.push((format!("metadata[{key}]"), value.clone()));
    }
    form_body
}

/// Pulls `error.message` out of a Stripe error body, or returns the body as-is.
fn api_error_message(body_text: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body_text) {
        Ok(json_body) => json_body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or(body_text),
        Err(_) => body_text,
    }
}

impl PaymentService for StripePaymentService {
    type Error = StripeError;

    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        Box::pin(async move {
            let api_url = format!("{}/v1/checkout/sessions", self.api_base);
            let form_body = checkout_form(&request);

            info!("[Stripe Logic] Sending request to Stripe API: {}", api_url);
            let response = self
                .client
                .post(&api_url)
                .basic_auth(&self.secret_key, None::<&str>)
                .header("Idempotency-Key", Uuid::new_v4().to_string())
                .form(&form_body)
                .send()
                .await?;

            let status = response.status();
            let body_text = response.text().await?;

            if !status.is_success() {
                let message = api_error_message(body_text);
                error!(
                    "[Stripe Logic] Stripe API request failed with HTTP status: {}. Message: {}",
                    status, message
                );
                return Err(StripeError::ApiError {
                    status_code: status.as_u16(),
                    message,
                });
            }

            let stripe_response: StripeCheckoutSessionApiResponse = serde_json::from_str(&body_text)?;
            match stripe_response.url {
                Some(url) => Ok(CheckoutSessionResult {
                    id: stripe_response.id,
                    url,
                }),
                None => {
                    error!(session_id = %stripe_response.id, "[Stripe Logic] Stripe response missing checkout session URL");
                    Err(StripeError::PaymentProviderError(
                        "Stripe response missing checkout URL".to_string(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use storefront_common::services::LineItem;

    #[test]
    fn encodes_indexed_fields() {
        let mut metadata = BTreeMap::new();
        metadata.insert("purchase_kind".to_string(), "cart".to_string());
        metadata.insert("file_ids".to_string(), r#"["a.pdf","b.pdf"]"#.to_string());

        let form = checkout_form(&CheckoutSessionRequest {
            currency: "mxn".to_string(),
            payment_method_types: vec!["card".to_string(), "oxxo".to_string()],
            line_items: vec![
                LineItem { name: "A".to_string(), unit_amount: 100, quantity: 1 },
                LineItem { name: "B".to_string(), unit_amount: 250, quantity: 1 },
            ],
            success_url: "https://shop.test/ok".to_string(),
            cancel_url: "https://shop.test/cancel".to_string(),
            customer_email: Some("cliente@shop.test".to_string()),
            metadata,
        });

        let get = |key: &str| form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("payment_method_types[1]"), Some("oxxo"));
        assert_eq!(get("line_items[1][price_data][unit_amount]"), Some("250"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("mxn"));
        assert_eq!(get("line_items[1][quantity]"), Some("1"));
        assert_eq!(get("customer_email"), Some("cliente@shop.test"));
        assert_eq!(get("metadata[file_ids]"), Some(r#"["a.pdf","b.pdf"]"#));
    }

    #[test]
    fn extracts_stripe_error_message() {
        let body = r#"{"error":{"message":"Invalid currency: xyz","type":"invalid_request_error"}}"#;
        assert_eq!(api_error_message(body.to_string()), "Invalid currency: xyz");
        assert_eq!(api_error_message("gateway down".to_string()), "gateway down");
    }
}
