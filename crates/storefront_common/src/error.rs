// --- File: crates/storefront_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all storefront errors.
///
/// Each crate keeps its own error enum and implements
/// `From<SpecificError> for StorefrontError`, which is what handlers render.
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Webhook or request authenticity could not be established
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("{0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("{service_name}: {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for StorefrontError {
    fn status_code(&self) -> u16 {
        match self {
            StorefrontError::HttpError(_) => 500,
            StorefrontError::ParseError(_) => 400,
            StorefrontError::ConfigError(_) => 500,
            StorefrontError::AuthError(_) => 400,
            StorefrontError::ValidationError(_) => 400,
            // Upstream failures are reported as 500 so the payment processor retries.
            StorefrontError::ExternalServiceError { .. } => 500,
            StorefrontError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for StorefrontError {
    fn from(err: reqwest::Error) -> Self {
        StorefrontError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        StorefrontError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> StorefrontError {
    StorefrontError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> StorefrontError {
    StorefrontError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> StorefrontError {
    StorefrontError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
