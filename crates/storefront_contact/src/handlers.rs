// --- File: crates/storefront_contact/src/handlers.rs ---
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use storefront_common::services::DynNotificationService;
use storefront_common::StorefrontError;
use storefront_config::AppConfig;
use tracing::{error, warn};

use crate::error::ContactError;
use crate::logic::{relay_contact_message, relay_inbound_email, ContactRequest, RelayOutcome};

#[derive(Clone)]
pub struct ContactState {
    pub config: Arc<AppConfig>,
    pub notification_service: DynNotificationService,
}

/// Relays a contact form submission to the operators.
#[axum::debug_handler]
pub async fn contact_handler(
    State(state): State<Arc<ContactState>>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<Value>, StorefrontError> {
    let Json(payload) = payload.map_err(|rejection| ContactError::InvalidBody(rejection.body_text()))?;

    relay_contact_message(&state.config, state.notification_service.as_ref(), payload)
        .await
        .map_err(|e| {
            match &e {
                ContactError::MissingField(_) | ContactError::InvalidBody(_) => warn!("Contact form rejected: {}", e),
                _ => error!("Contact form relay failed: {}", e),
            }
            StorefrontError::from(e)
        })?;

    Ok(Json(json!({ "message": "Enviado con éxito." })))
}

/// Inbound email hook. Always acknowledged so the provider does not retry.
#[axum::debug_handler]
pub async fn resend_inbound_handler(
    State(state): State<Arc<ContactState>>,
    body: Bytes,
) -> Json<Value> {
    let outcome = relay_inbound_email(&state.config, state.notification_service.as_ref(), &body).await;
    if let RelayOutcome::Failed(reason) = &outcome {
        error!("Inbound relay failed, acknowledging anyway: {}", reason);
    }
    Json(json!({ "received": true }))
}
