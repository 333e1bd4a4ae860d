// --- File: crates/storefront_contact/src/error.rs ---
use storefront_common::{external_service_error, HttpStatusCode, StorefrontError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Contact configuration error: {0}")]
    ConfigError(String),

    #[error("Error al enviar el mensaje: {0}")]
    SendFailed(String),
}

impl HttpStatusCode for ContactError {
    fn status_code(&self) -> u16 {
        match self {
            ContactError::MissingField(_) | ContactError::InvalidBody(_) => 400,
            ContactError::ConfigError(_) | ContactError::SendFailed(_) => 500,
        }
    }
}

impl From<ContactError> for StorefrontError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::MissingField(_) | ContactError::InvalidBody(_) => {
                StorefrontError::ValidationError(err.to_string())
            }
            ContactError::ConfigError(msg) => StorefrontError::ConfigError(msg),
            ContactError::SendFailed(_) => external_service_error("Email provider", err),
        }
    }
}
