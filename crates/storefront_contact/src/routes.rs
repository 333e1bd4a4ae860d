// --- File: crates/storefront_contact/src/routes.rs ---

use crate::handlers::{contact_handler, resend_inbound_handler, ContactState};
use axum::{routing::post, Router};
use std::sync::Arc;
use storefront_common::services::DynNotificationService;
use storefront_config::AppConfig;

/// Creates a router containing the contact form and inbound email routes.
pub fn routes(config: Arc<AppConfig>, notification_service: DynNotificationService) -> Router {
    let contact_state = Arc::new(ContactState {
        config,
        notification_service,
    });

    Router::new()
        .route("/enviar-contacto", post(contact_handler))
        // Older storefront pages post here
        .route("/enviar-formulario", post(contact_handler))
        .route("/resend-inbound", post(resend_inbound_handler))
        .with_state(contact_state)
}
