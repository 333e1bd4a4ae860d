// --- File: crates/storefront_contact/src/lib.rs ---

pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
#[cfg(feature = "openapi")]
pub mod doc;

pub use error::ContactError;
pub use handlers::ContactState;
pub use logic::{ContactRequest, InboundEmailEvent};
pub use routes::routes;
