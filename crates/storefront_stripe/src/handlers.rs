// --- File: crates/storefront_stripe/src/handlers.rs ---
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;
use storefront_common::services::{DynNotificationService, DynPaymentService};
use storefront_common::{config_error, validation_error, StorefrontError};
use storefront_config::{resolved_secret, AppConfig};
use tracing::{error, info, warn};

use crate::logic::{
    create_checkout_session, process_stripe_webhook, verify_stripe_signature,
    CreateCheckoutSessionRequest, CreateCheckoutSessionResponse, StripeEvent, WebhookOutcome,
    SIGNATURE_HEADER,
};

// --- State for Stripe Handlers ---
#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<AppConfig>,
    pub payment_service: DynPaymentService,
    pub notification_service: DynNotificationService,
}

/// Axum handler to create a Stripe Checkout Session.
#[axum::debug_handler]
pub async fn create_checkout_session_handler(
    State(state): State<Arc<StripeState>>,
    payload: Result<Json<CreateCheckoutSessionRequest>, JsonRejection>,
) -> Result<Json<CreateCheckoutSessionResponse>, StorefrontError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected checkout body: {}", rejection.body_text());
        validation_error(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let stripe_config = state
        .config
        .stripe
        .as_ref()
        .ok_or_else(|| config_error("Stripe configuration not loaded."))?;

    create_checkout_session(state.payment_service.as_ref(), stripe_config, payload)
        .await
        .map(Json)
        .map_err(StorefrontError::from)
}

fn webhook_error(reason: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", reason)).into_response()
}

/// Stripe's server-to-server notification endpoint. The body is taken raw
/// because the signature covers the exact bytes sent.
#[axum::debug_handler]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(stripe_config) = state.config.stripe.as_ref() else {
        return config_error("Stripe configuration not loaded.").into_response();
    };
    let Some(webhook_secret) = resolved_secret(&stripe_config.webhook_secret) else {
        error!("STRIPE_WEBHOOK_SECRET is not set, cannot verify webhooks");
        return config_error("Webhook secret not configured.").into_response();
    };

    let sig_header = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
    if let Err(e) = verify_stripe_signature(
        &body,
        sig_header,
        webhook_secret,
        stripe_config.webhook_tolerance_secs,
    ) {
        warn!("Stripe webhook signature verification failed: {}", e);
        return webhook_error(e);
    }

    // Deserialize only after the signature checked out
    let event: StripeEvent = match serde_json::from_slice(&body) {
        Ok(ev) => ev,
        Err(e) => {
            warn!("Failed to deserialize Stripe webhook event: {}", e);
            return webhook_error(format!("Invalid payload: {}", e));
        }
    };

    match process_stripe_webhook(event, &state.config, state.notification_service.as_ref()).await {
        Ok(outcome) => {
            if let WebhookOutcome::Delivered(report) = &outcome {
                info!(email_id = %report.email_id, links = report.links.len(), "Stripe webhook processed");
            }
            Json(json!({ "received": true })).into_response()
        }
        Err(e) => {
            error!("Error processing Stripe webhook: {}", e);
            StorefrontError::from(e).into_response()
        }
    }
}
