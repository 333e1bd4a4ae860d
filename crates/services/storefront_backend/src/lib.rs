// --- File: crates/services/storefront_backend/src/lib.rs ---

pub mod app_state;
pub mod router;
pub mod service_factory;

pub use app_state::AppState;
pub use router::build_router;
pub use service_factory::StorefrontServiceFactory;
