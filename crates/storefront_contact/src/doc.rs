// --- File: crates/storefront_contact/src/doc.rs ---
#![allow(dead_code)]
use utoipa::OpenApi;
use crate::logic::{ContactRequest, InboundEmailData, InboundEmailEvent};

#[utoipa::path(
    post,
    path = "/enviar-contacto",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message relayed to the operators", example = json!({ "message": "Enviado con éxito." })),
        (status = 400, description = "A field is missing", example = json!({ "error": "Missing field: mensaje" })),
        (status = 500, description = "The email provider rejected the message")
    ),
    tag = "Contact"
)]
fn doc_contact_handler() {}

#[utoipa::path(
    post,
    path = "/enviar-formulario",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Alias of /enviar-contacto"),
        (status = 400, description = "A field is missing"),
        (status = 500, description = "The email provider rejected the message")
    ),
    tag = "Contact"
)]
fn doc_contact_form_alias_handler() {}

#[utoipa::path(
    post,
    path = "/resend-inbound",
    request_body = InboundEmailEvent,
    responses(
        (status = 200, description = "Always acknowledged", example = json!({ "received": true }))
    ),
    tag = "Contact"
)]
fn doc_resend_inbound_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_contact_handler, doc_contact_form_alias_handler, doc_resend_inbound_handler),
    components(schemas(ContactRequest, InboundEmailEvent, InboundEmailData)),
    tags((name = "Contact", description = "Contact form and inbound email relay"))
)]
pub struct ContactApiDoc;
