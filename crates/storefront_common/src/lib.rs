// --- File: crates/storefront_common/src/lib.rs ---

// Declare modules within this crate
pub mod models;    // Cart, checkout metadata and catalog types
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod services;  // Service abstractions
pub mod logging;   // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    StorefrontError,
    HttpStatusCode,
    config_error,
    validation_error,
    external_service_error,
};

// Re-export HTTP utilities for easier access
pub use http::{
    IntoHttpResponse,
    error_body,
    escape_html,
    client::HTTP_CLIENT,
};

pub use models::{CartItem, CheckoutMetadata, MetadataError, Product, PurchaseKind};
pub use services::{
    BoxFuture, BoxedError, EmailMessage, NotificationService, PaymentService, ServiceFactory,
};

// This crate provides functionality shared by the storefront crates:
// the error model and its HTTP rendering, the shared HTTP client, logging setup,
// the service traits, and the metadata format that links checkout to delivery.
