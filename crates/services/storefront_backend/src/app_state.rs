// --- File: crates/services/storefront_backend/src/app_state.rs ---
use std::sync::Arc;
use storefront_common::services::ServiceFactory;
use storefront_config::AppConfig;

use crate::service_factory::StorefrontServiceFactory;

/// Application state that is shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The configuration loaded at startup.
    pub config: Arc<AppConfig>,

    /// Source of the payment and email handles.
    pub service_factory: Arc<dyn ServiceFactory>,
}

impl AppState {
    /// Builds the real services from `config`.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let service_factory = Arc::new(StorefrontServiceFactory::new(config.clone()));
        Self {
            config,
            service_factory,
        }
    }

    /// State over an explicit factory, e.g. one holding fakes.
    pub fn with_service_factory(config: Arc<AppConfig>, service_factory: Arc<dyn ServiceFactory>) -> Self {
        Self {
            config,
            service_factory,
        }
    }
}
