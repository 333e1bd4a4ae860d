// --- File: crates/storefront_stripe/src/lib.rs ---

pub mod logic;
pub mod handlers;
pub mod routes;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod error;
pub mod service;

// Re-export for main backend
pub use routes::routes;
pub use logic::{CreateCheckoutSessionRequest, CreateCheckoutSessionResponse, PurchaseRequest};
pub use handlers::StripeState;
pub use error::StripeError;
pub use service::StripePaymentService;
