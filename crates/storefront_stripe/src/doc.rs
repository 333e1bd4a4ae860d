// --- File: crates/storefront_stripe/src/doc.rs ---
#![allow(dead_code)]
use utoipa::OpenApi;
use crate::logic::{
    CheckoutItemPayload, CreateCheckoutSessionRequest, CreateCheckoutSessionResponse,
    StripeCheckoutSessionObject, StripeCustomerDetails, StripeEvent, StripeEventData,
};

#[utoipa::path(
    post,
    path = "/crear-sesion-pago",
    request_body(content = CreateCheckoutSessionRequest, example = json!({
        "items": [
            { "nombre": "Guía de trámites 2025", "precio": 15000, "archivo": "guia-tramites.pdf" },
            { "nombre": "Formato de contrato", "precio": 5000, "archivo": "contrato.docx" }
        ],
        "email": "cliente@example.com"
    })),
    responses(
        (status = 200, description = "Stripe Checkout Session created", body = CreateCheckoutSessionResponse),
        (status = 400, description = "Missing or invalid purchase fields"),
        (status = 500, description = "Stripe rejected the session or configuration is missing")
    ),
    tag = "Stripe"
)]
fn doc_create_checkout_session_handler() {}

#[utoipa::path(
    post,
    path = "/webhook",
    request_body = StripeEvent,
    params(
        ("Stripe-Signature" = String, Header, description = "t=<timestamp>,v1=<hex HMAC-SHA256>")
    ),
    responses(
        (status = 200, description = "Event acknowledged", example = json!({ "received": true })),
        (status = 400, description = "Signature or payload rejected (plain text)", content_type = "text/plain"),
        (status = 500, description = "Download email could not be sent; Stripe will retry")
    ),
    tag = "Stripe Webhooks"
)]
fn doc_stripe_webhook_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_create_checkout_session_handler,
        doc_stripe_webhook_handler,
    ),
    components(
        schemas(
            CreateCheckoutSessionRequest, CheckoutItemPayload, CreateCheckoutSessionResponse,
            StripeEvent, StripeEventData, StripeCheckoutSessionObject, StripeCustomerDetails,
        )
    ),
    tags(
        (name = "Stripe", description = "Stripe Checkout for the storefront"),
        (name = "Stripe Webhooks", description = "Stripe Server-to-Server Webhooks")
    )
)]
pub struct StripeApiDoc;
