// --- File: crates/storefront_stripe/src/logic.rs ---
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::Sha256;
use std::collections::HashMap;
use storefront_common::services::{CheckoutSessionRequest, LineItem};
use storefront_common::{CartItem, CheckoutMetadata, NotificationService, PaymentService};
use storefront_config::{AppConfig, StripeConfig};
use storefront_fulfillment::{deliver_purchase, CompletedPurchase, DeliveryReport};
use tracing::{error, info, warn};

// Import the StripeError from the error module
use crate::error::StripeError;

// Conditionally import ToSchema if openapi feature is enabled
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Header carrying `t=<unix ts>,v1=<hex hmac>[,v1=...]`.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
/// Delayed methods such as OXXO vouchers settle after the session completes.
pub const CHECKOUT_ASYNC_PAYMENT_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";
pub const CHECKOUT_ASYNC_PAYMENT_FAILED: &str = "checkout.session.async_payment_failed";

// --- Data Structures ---

/// One cart entry as sent by the storefront. Field names are accepted in
/// Spanish (`nombre`, `precio`, `archivo`) or English.
#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CheckoutItemPayload {
    #[serde(default, alias = "nombre")]
    #[cfg_attr(feature = "openapi", schema(example = "Guía de trámites 2025"))]
    pub name: Option<String>,
    /// Integer minor units. Numeric strings are accepted.
    #[serde(default, alias = "precio")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i64>, example = 15000))]
    pub price: Option<Value>,
    #[serde(default, alias = "archivo")]
    #[cfg_attr(feature = "openapi", schema(example = "guia-tramites.pdf"))]
    pub file: Option<String>,
}

/// Request from the storefront to create a Stripe Checkout Session: either
/// a cart (`items`) or a single direct purchase (`name` + `price`).
#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub items: Option<Vec<CheckoutItemPayload>>,
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "precio")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i64>))]
    pub price: Option<Value>,
    #[serde(default, alias = "archivo")]
    pub file: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "cliente@example.com"))]
    pub email: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionResponse {
    #[cfg_attr(
        feature = "openapi",
        schema(example = "https://checkout.stripe.com/c/pay/cs_test_a1...")
    )]
    pub url: String,
    #[cfg_attr(feature = "openapi", schema(example = "cs_test_a1..."))]
    pub session_id: String,
}

/// A checkout request after boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseRequest {
    Cart {
        items: Vec<CartItem>,
        customer_email: Option<String>,
    },
    Single {
        name: String,
        price: i64,
        file: Option<String>,
        customer_email: Option<String>,
    },
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// File identifiers travel to the webhook byte for byte; only all-blank ones are dropped.
fn file_id(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Prices must be non-negative integers in minor units.
fn parse_price(value: &Value, field: &str) -> Result<i64, StripeError> {
    let invalid = || StripeError::InvalidRequest(format!("{field} must be a non-negative integer"));
    let price = match value {
        Value::Number(n) => match n.as_i64() {
            Some(p) => p,
            None => match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                _ => return Err(invalid()),
            },
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if price < 0 {
        return Err(invalid());
    }
    Ok(price)
}

impl CreateCheckoutSessionRequest {
    /// A non-empty `items` list selects cart mode and the direct fields are
    /// ignored; otherwise `name` and `price` are required.
    pub fn into_purchase(self) -> Result<PurchaseRequest, StripeError> {
        let customer_email = non_blank(self.email);

        if let Some(items) = self.items.filter(|items| !items.is_empty()) {
            let items = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| -> Result<CartItem, StripeError> {
                    let name = non_blank(item.name)
                        .ok_or_else(|| StripeError::InvalidRequest(format!("items[{i}].name is required")))?;
                    let price_value = item
                        .price
                        .ok_or_else(|| StripeError::InvalidRequest(format!("items[{i}].price is required")))?;
                    let price = parse_price(&price_value, &format!("items[{i}].price"))?;
                    let file = file_id(item.file)
                        .ok_or_else(|| StripeError::InvalidRequest(format!("items[{i}].file is required")))?;
                    Ok(CartItem { name, price, file })
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(PurchaseRequest::Cart {
                items,
                customer_email,
            });
        }

        match (non_blank(self.name), self.price) {
            (Some(name), Some(price)) => Ok(PurchaseRequest::Single {
                name,
                price: parse_price(&price, "price")?,
                file: file_id(self.file),
                customer_email,
            }),
            _ => Err(StripeError::InvalidRequest(
                "Provide a non-empty items list or a name and price".to_string(),
            )),
        }
    }
}

impl PurchaseRequest {
    pub fn line_items(&self) -> Vec<LineItem> {
        match self {
            PurchaseRequest::Cart { items, .. } => items
                .iter()
                .map(|item| LineItem {
                    name: item.name.clone(),
                    unit_amount: item.price,
                    quantity: 1,
                })
                .collect(),
            PurchaseRequest::Single { name, price, .. } => vec![LineItem {
                name: name.clone(),
                unit_amount: *price,
                quantity: 1,
            }],
        }
    }

    pub fn checkout_metadata(&self) -> CheckoutMetadata {
        match self {
            PurchaseRequest::Cart { items, .. } => {
                CheckoutMetadata::cart(items.iter().map(|item| item.file.clone()).collect())
            }
            PurchaseRequest::Single { file, .. } => CheckoutMetadata::single(file.clone()),
        }
    }

    pub fn customer_email(&self) -> Option<&str> {
        match self {
            PurchaseRequest::Cart { customer_email, .. }
            | PurchaseRequest::Single { customer_email, .. } => customer_email.as_deref(),
        }
    }
}

/// Assembles the processor request: line items, metadata naming the files,
/// and the configured session parameters.
pub fn build_checkout_session_request(
    stripe_config: &StripeConfig,
    purchase: &PurchaseRequest,
) -> Result<CheckoutSessionRequest, StripeError> {
    Ok(CheckoutSessionRequest {
        currency: stripe_config.currency.to_lowercase(),
        payment_method_types: stripe_config.payment_method_types.clone(),
        line_items: purchase.line_items(),
        success_url: stripe_config.success_url.clone(),
        cancel_url: stripe_config.cancel_url.clone(),
        customer_email: purchase.customer_email().map(String::from),
        metadata: purchase.checkout_metadata().to_metadata()?,
    })
}

// --- Core Logic Function ---

/// Validates the payload and asks the processor for a hosted checkout page.
pub async fn create_checkout_session<P>(
    payment_service: &P,
    stripe_config: &StripeConfig,
    request_data: CreateCheckoutSessionRequest,
) -> Result<CreateCheckoutSessionResponse, StripeError>
where
    P: PaymentService + ?Sized,
{
    let purchase = request_data.into_purchase()?;
    let session_request = build_checkout_session_request(stripe_config, &purchase)?;
    let line_count = session_request.line_items.len();

    let session = payment_service
        .create_checkout_session(session_request)
        .await
        .map_err(|e| {
            error!(error = %e, "[Stripe Logic] Checkout session creation failed");
            StripeError::PaymentProviderError(e.to_string())
        })?;

    info!(
        session_id = %session.id,
        line_items = line_count,
        cart = matches!(purchase, PurchaseRequest::Cart { .. }),
        "[Stripe Logic] Checkout Session created"
    );
    Ok(CreateCheckoutSessionResponse {
        url: session.url,
        session_id: session.id,
    })
}

// --- Webhook Structures ---

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEventData {
    /// The object the event is about; its shape varies by event type.
    pub object: Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeCustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// The `data.object` of the checkout session events. Only the fields
/// delivery needs.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeCheckoutSessionObject {
    #[serde(default)]
    pub id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_details: Option<StripeCustomerDetails>,
    pub customer_email: Option<String>,
    /// `None` when absent or not a string map.
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: Option<HashMap<String, String>>,
    /// "paid", "unpaid" or "no_payment_required".
    pub payment_status: Option<String>,
    pub status: Option<String>,
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl StripeCheckoutSessionObject {
    /// The address Stripe collected, falling back to the one we prefilled.
    pub fn purchaser_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    fn into_completed_purchase(self, customer_email: String) -> CompletedPurchase {
        CompletedPurchase {
            session_id: self.id,
            customer_email,
            customer_name: self.customer_details.and_then(|d| d.name),
            amount_total: self.amount_total,
            currency: self.currency,
            metadata: self.metadata,
        }
    }
}

/// What a verified event led to.
#[derive(Debug)]
pub enum WebhookOutcome {
    Delivered(DeliveryReport),
    /// Completed but not yet paid; the async success event delivers later.
    AwaitingPayment,
    /// Paid, but the session carries no purchaser address.
    NoRecipient,
    Ignored,
}

// --- Webhook Processing Logic ---

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `"<timestamp>.<payload>"`, computed over the raw bytes.
pub fn compute_signature(secret: &str, timestamp: &str, payload: &[u8]) -> Result<String, StripeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds a `Stripe-Signature` header value for `payload`.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, StripeError> {
    let timestamp = timestamp.to_string();
    let signature = compute_signature(secret, &timestamp, payload)?;
    Ok(format!("t={timestamp},v1={signature}"))
}

/// Verifies the signature of an incoming Stripe webhook request.
///
/// # Arguments
/// * `payload_bytes` - The raw request body bytes.
/// * `sig_header` - The value of the 'Stripe-Signature' header.
/// * `secret` - The webhook signing secret (whsec_...).
/// * `tolerance_secs` - Maximum age of the signed timestamp; `None` disables the check.
pub fn verify_stripe_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: Option<i64>,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();

    for item in sig_header_value.split(',') {
        if let Some((key, value)) = item.trim().split_once('=') {
            match key {
                "t" => timestamp_str = Some(value),
                "v1" => v1_signatures_hex.push(value),
                _ => {} // Ignore other schemes like v0
            }
        }
    }

    let timestamp_str = timestamp_str.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let parsed_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        StripeError::WebhookSignatureError("Invalid timestamp format in Stripe-Signature".to_string())
    })?;

    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    if let Some(tolerance) = tolerance_secs.filter(|t| *t > 0) {
        let now = Utc::now().timestamp();
        if now.abs_diff(parsed_timestamp) > tolerance.unsigned_abs() {
            warn!(now, event_timestamp = parsed_timestamp, tolerance, "Stripe webhook timestamp outside tolerance");
            return Err(StripeError::WebhookSignatureError(
                "Timestamp outside the tolerance zone".to_string(),
            ));
        }
    }

    let calculated_signature_hex = compute_signature(secret, timestamp_str, payload_bytes)?;

    if v1_signatures_hex
        .iter()
        .any(|provided| constant_time_eq::constant_time_eq(calculated_signature_hex.as_bytes(), provided.as_bytes()))
    {
        return Ok(());
    }

    Err(StripeError::WebhookSignatureError(
        "No signatures found matching the expected signature for payload".to_string(),
    ))
}

/// Processes a verified Stripe webhook event. At most one email is sent.
pub async fn process_stripe_webhook<N>(
    event: StripeEvent,
    app_config: &AppConfig,
    notifier: &N,
) -> Result<WebhookOutcome, StripeError>
where
    N: NotificationService + ?Sized,
{
    info!(event_id = %event.id, event_type = %event.event_type, "Processing Stripe event");

    match event.event_type.as_str() {
        CHECKOUT_SESSION_COMPLETED | CHECKOUT_ASYNC_PAYMENT_SUCCEEDED => {
            let session: StripeCheckoutSessionObject = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    StripeError::WebhookPayloadError(format!(
                        "Failed to parse checkout session object: {}",
                        e
                    ))
                })?;

            if event.event_type == CHECKOUT_SESSION_COMPLETED
                && session.payment_status.as_deref() == Some("unpaid")
            {
                info!(session_id = %session.id, "Checkout session completed but unpaid, waiting for async payment");
                return Ok(WebhookOutcome::AwaitingPayment);
            }

            let Some(customer_email) = session.purchaser_email().map(String::from) else {
                error!(session_id = %session.id, "Paid checkout session has no purchaser email, cannot deliver");
                return Ok(WebhookOutcome::NoRecipient);
            };

            info!(
                session_id = %session.id,
                amount_total = ?session.amount_total,
                currency = ?session.currency,
                "Payment received"
            );
            let purchase = session.into_completed_purchase(customer_email);
            let report = deliver_purchase(app_config, notifier, &purchase).await?;
            Ok(WebhookOutcome::Delivered(report))
        }
        CHECKOUT_ASYNC_PAYMENT_FAILED => {
            let session_id = event.data.object.get("id").and_then(|v| v.as_str());
            warn!(?session_id, "Asynchronous payment failed, nothing to deliver");
            Ok(WebhookOutcome::Ignored)
        }
        _ => {
            info!(event_type = %event.event_type, "Received unhandled Stripe event type");
            Ok(WebhookOutcome::Ignored)
        }
    }
}
