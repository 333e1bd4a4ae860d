// --- File: crates/storefront_stripe/src/error.rs ---
use storefront_common::{
    external_service_error, HttpStatusCode, MetadataError, StorefrontError,
};
use storefront_fulfillment::FulfillmentError;
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// The checkout payload was missing fields or carried bad values
    #[error("{0}")]
    InvalidRequest(String),

    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Session creation failed behind the payment service handle
    #[error("{0}")]
    PaymentProviderError(String),

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration error: {0}")]
    ConfigError(String),

    /// Webhook signature verification failed
    #[error("{0}")]
    WebhookSignatureError(String),

    /// Verified webhook body that is not a Stripe event
    #[error("Invalid webhook payload: {0}")]
    WebhookPayloadError(String),

    /// The download email could not be sent
    #[error("{0}")]
    DeliveryFailed(String),
}

impl From<MetadataError> for StripeError {
    fn from(err: MetadataError) -> Self {
        StripeError::InvalidRequest(err.to_string())
    }
}

impl From<FulfillmentError> for StripeError {
    fn from(err: FulfillmentError) -> Self {
        match err {
            FulfillmentError::ConfigError(msg) => StripeError::ConfigError(msg),
            FulfillmentError::DeliveryFailed(_) => StripeError::DeliveryFailed(err.to_string()),
        }
    }
}

/// Convert StripeError to StorefrontError
impl From<StripeError> for StorefrontError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::InvalidRequest(msg) => StorefrontError::ValidationError(msg),
            StripeError::RequestError(e) => StorefrontError::HttpError(format!("Stripe request error: {}", e)),
            StripeError::ApiError { message, .. } => external_service_error("Stripe API", message),
            StripeError::ParseError(e) => StorefrontError::InternalError(format!("Stripe response parse error: {}", e)),
            StripeError::PaymentProviderError(msg) => external_service_error("Stripe API", msg),
            StripeError::ConfigError(msg) => StorefrontError::ConfigError(msg),
            StripeError::WebhookSignatureError(msg) => StorefrontError::AuthError(msg),
            StripeError::WebhookPayloadError(msg) => StorefrontError::ParseError(msg),
            StripeError::DeliveryFailed(msg) => external_service_error("Email provider", msg),
        }
    }
}

/// Implement HttpStatusCode for StripeError to provide a consistent way to convert
/// StripeError to HTTP status codes.
impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::InvalidRequest(_) => 400,
            StripeError::RequestError(_) => 500,
            StripeError::ApiError { .. } => 500,
            StripeError::ParseError(_) => 500,
            StripeError::PaymentProviderError(_) => 500,
            StripeError::ConfigError(_) => 500,
            StripeError::WebhookSignatureError(_) => 400,
            StripeError::WebhookPayloadError(_) => 400,
            StripeError::DeliveryFailed(_) => 500,
        }
    }
}
