// --- File: crates/storefront_email/src/error.rs ---
use storefront_common::{external_service_error, HttpStatusCode, StorefrontError};
use thiserror::Error;

/// Email delivery error types.
#[derive(Error, Debug)]
pub enum EmailError {
    /// Error occurred during an email API request
    #[error("Email API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the email API
    #[error("Email API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing the email API response
    #[error("Failed to parse email API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete email configuration
    #[error("Email configuration missing or incomplete: {0}")]
    ConfigError(String),

    /// The message has nobody to go to
    #[error("Email has no recipients")]
    NoRecipients,

    /// A sender, recipient or reply-to address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl From<EmailError> for StorefrontError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::ConfigError(msg) => StorefrontError::ConfigError(msg),
            EmailError::NoRecipients => StorefrontError::ConfigError("Email has no recipients".to_string()),
            other => external_service_error("Email provider", other),
        }
    }
}

impl HttpStatusCode for EmailError {
    fn status_code(&self) -> u16 {
        // Every email failure is a server-side failure from the caller's point of view.
        500
    }
}
