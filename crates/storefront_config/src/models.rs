// --- File: crates/storefront_config/src/models.rs ---

use serde::{Deserialize, Serialize};

/// Placeholder value that marks a config string as "read me from the environment".
pub const SECRET_MARKER: &str = "secret_from_env";

/// Returns the secret unless it is empty or still the unresolved marker.
pub fn resolved_secret(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == SECRET_MARKER {
        None
    } else {
        Some(trimmed)
    }
}

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn default_currency() -> String {
    "mxn".to_string()
}

fn default_payment_method_types() -> Vec<String> {
    vec!["card".to_string(), "oxxo".to_string()]
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_webhook_tolerance_secs() -> Option<i64> {
    Some(300)
}

// --- Stripe Config ---
// Secrets are usually "secret_from_env" in the file and injected from
// STRIPE_SECRET_KEY / STRIPE_WEBHOOK_SECRET at load time.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_payment_method_types")]
    pub payment_method_types: Vec<String>,
    /// May contain the literal `{CHECKOUT_SESSION_ID}` template.
    pub success_url: String,
    pub cancel_url: String,
    #[serde(default = "default_stripe_api_base")]
    pub api_base: String,
    /// Maximum age of a webhook signature timestamp. `None` disables the check.
    #[serde(default = "default_webhook_tolerance_secs")]
    pub webhook_tolerance_secs: Option<i64>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    #[default]
    Resend,
    Smtp,
}

// --- Email Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    #[serde(default)]
    pub provider: EmailProvider,
    pub from_address: String,
}

fn default_resend_api_base() -> String {
    "https://api.resend.com".to_string()
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResendConfig {
    pub api_key: String, // RESEND_API_KEY
    #[serde(default = "default_resend_api_base")]
    pub api_base: String,
}

fn default_smtp_port() -> u16 {
    587
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>, // SMTP_PASSWORD
}

fn default_delivery_subject() -> String {
    "¡Tu descarga está lista!".to_string()
}

// --- Delivery (download email) Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeliveryConfig {
    /// Public base path the purchased file identifiers are appended to.
    pub download_base_url: String,
    /// Falls back to `email.from_address` when absent.
    pub from_address: Option<String>,
    #[serde(default = "default_delivery_subject")]
    pub subject: String,
    pub store_name: Option<String>,
    pub support_email: Option<String>,
}

// --- Contact / Inbound relay Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ContactConfig {
    /// Falls back to `email.from_address` when absent.
    pub from_address: Option<String>,
    #[serde(default)]
    pub operator_addresses: Vec<String>,
    #[serde(default)]
    pub inbound_forward_addresses: Vec<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    /// Origin allowed by CORS. Any origin is allowed when absent.
    #[serde(default)]
    pub frontend_url: Option<String>,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,
    #[serde(default)]
    pub use_contact: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub resend: Option<ResendConfig>,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub delivery: Option<DeliveryConfig>,
    #[serde(default)]
    pub contact: Option<ContactConfig>,
}

impl AppConfig {
    /// Sender address for an outbound email, preferring the section override.
    pub fn sender_address<'a>(&'a self, section_override: Option<&'a str>) -> Option<&'a str> {
        section_override
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.email.as_ref().map(|e| e.from_address.as_str()))
    }
}
