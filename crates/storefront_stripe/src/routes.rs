// --- File: crates/storefront_stripe/src/routes.rs ---

use crate::handlers::{create_checkout_session_handler, stripe_webhook_handler, StripeState};
use axum::{routing::post, Router};
use std::sync::Arc;
use storefront_common::services::{DynNotificationService, DynPaymentService};
use storefront_config::AppConfig;

/// Creates a router containing all routes for the Stripe feature.
pub fn routes(
    config: Arc<AppConfig>,
    payment_service: DynPaymentService,
    notification_service: DynNotificationService,
) -> Router {
    let stripe_state = Arc::new(StripeState {
        config,
        payment_service,
        notification_service,
    });

    Router::new()
        .route("/crear-sesion-pago", post(create_checkout_session_handler))
        // Server-to-server notifications from Stripe (raw body)
        .route("/webhook", post(stripe_webhook_handler))
        .with_state(stripe_state)
}
