// --- File: crates/storefront_contact/src/logic.rs ---
use serde::Deserialize;
use serde_json::Value;
use storefront_common::{escape_html, EmailMessage, NotificationService};
use storefront_config::AppConfig;
use tracing::{info, warn};

use crate::error::ContactError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Body used when an inbound email carries neither HTML nor text.
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "(Sin contenido)";

/// Contact form submission. The storefront posts the Spanish field names;
/// English ones are accepted too.
#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ContactRequest {
    #[serde(default, alias = "name")]
    #[cfg_attr(feature = "openapi", schema(example = "María López"))]
    pub nombre: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "maria@example.com"))]
    pub email: Option<String>,
    #[serde(default, alias = "message")]
    #[cfg_attr(feature = "openapi", schema(example = "Quisiera información sobre sus servicios."))]
    pub mensaje: Option<String>,
}

/// A submission with every field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub nombre: String,
    pub email: String,
    pub mensaje: String,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ContactError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ContactError::MissingField(field))
}

impl ContactRequest {
    pub fn validate(self) -> Result<ContactSubmission, ContactError> {
        Ok(ContactSubmission {
            nombre: required(self.nombre, "nombre")?,
            email: required(self.email, "email")?,
            mensaje: required(self.mensaje, "mensaje")?,
        })
    }
}

pub fn compose_contact_email(sender: &str, operators: &[String], submission: &ContactSubmission) -> EmailMessage {
    let html = format!(
        "<h2>Nuevo Mensaje</h2>\
<p><strong>Nombre:</strong> {}</p>\
<p><strong>Email:</strong> {}</p>\
<p><strong>Mensaje:</strong> {}</p>",
        escape_html(&submission.nombre),
        escape_html(&submission.email),
        escape_html(&submission.mensaje).replace('\n', "<br>"),
    );
    let text = format!(
        "Nombre: {}\nEmail: {}\nMensaje:\n{}\n",
        submission.nombre, submission.email, submission.mensaje
    );

    EmailMessage {
        from: sender.to_string(),
        to: operators.to_vec(),
        subject: format!("Nuevo mensaje de contacto de: {}", submission.nombre),
        html,
        text: Some(text),
        reply_to: Some(submission.email.clone()),
    }
}

/// Sends one submission to the configured operator addresses.
pub async fn relay_contact_message<N>(
    config: &AppConfig,
    notifier: &N,
    request: ContactRequest,
) -> Result<(), ContactError>
where
    N: NotificationService + ?Sized,
{
    let submission = request.validate()?;

    let contact = config.contact.as_ref();
    let operators = contact
        .map(|c| c.operator_addresses.as_slice())
        .filter(|addresses| !addresses.is_empty())
        .ok_or_else(|| ContactError::ConfigError("No operator addresses configured".to_string()))?;
    let sender = config
        .sender_address(contact.and_then(|c| c.from_address.as_deref()))
        .ok_or_else(|| ContactError::ConfigError("No sender address configured".to_string()))?;

    let message = compose_contact_email(sender, operators, &submission);
    let result = notifier
        .send_email(message)
        .await
        .map_err(|e| ContactError::SendFailed(e.to_string()))?;

    info!(email_id = %result.id, from = %submission.email, "Contact message relayed");
    Ok(())
}

// --- Inbound email relay ---

/// Inbound email event posted by the email provider. Every field is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct InboundEmailEvent {
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub data: Option<InboundEmailData>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct InboundEmailData {
    pub from: Option<String>,
    /// A string or a list of strings, depending on the provider.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub to: Option<Value>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Re-addresses an inbound email to the personal inboxes: HTML body if any,
/// else the text body, else a placeholder.
pub fn compose_forward(sender: &str, forward_to: &[String], data: &InboundEmailData) -> EmailMessage {
    let original_from = present(&data.from);
    let content = match (present(&data.html), present(&data.text)) {
        (Some(html), _) => html.to_string(),
        (None, Some(text)) => format!(
            r#"<pre style="white-space: pre-wrap; font-family: inherit;">{}</pre>"#,
            escape_html(text)
        ),
        (None, None) => format!("<p>{}</p>", EMPTY_CONTENT_PLACEHOLDER),
    };
    let html = format!(
        "<p><strong>De:</strong> {}</p><hr>{}",
        escape_html(original_from.unwrap_or("desconocido")),
        content
    );

    EmailMessage {
        from: sender.to_string(),
        to: forward_to.to_vec(),
        subject: format!("Fwd: {}", present(&data.subject).unwrap_or("(sin asunto)")),
        html,
        text: present(&data.text).map(String::from),
        reply_to: original_from.map(String::from),
    }
}

/// What happened to an inbound event. The route answers 200 in every case.
#[derive(Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    Forwarded,
    Skipped(&'static str),
    Failed(String),
}

pub async fn relay_inbound_email<N>(config: &AppConfig, notifier: &N, body: &[u8]) -> RelayOutcome
where
    N: NotificationService + ?Sized,
{
    let event: InboundEmailEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Unparseable inbound email event, ignoring");
            return RelayOutcome::Skipped("unparseable body");
        }
    };
    let Some(data) = event.data else {
        warn!(event_type = ?event.event_type, "Inbound event without data, ignoring");
        return RelayOutcome::Skipped("no data");
    };

    let contact = config.contact.as_ref();
    let Some(forward_to) = contact
        .map(|c| c.inbound_forward_addresses.as_slice())
        .filter(|addresses| !addresses.is_empty())
    else {
        warn!("No inbound forward addresses configured, dropping inbound email");
        return RelayOutcome::Skipped("no forward addresses");
    };
    let Some(sender) = config.sender_address(contact.and_then(|c| c.from_address.as_deref())) else {
        warn!("No sender address configured, dropping inbound email");
        return RelayOutcome::Skipped("no sender address");
    };

    let message = compose_forward(sender, forward_to, &data);
    match notifier.send_email(message).await {
        Ok(result) => {
            info!(email_id = %result.id, from = ?data.from, subject = ?data.subject, "Inbound email forwarded");
            RelayOutcome::Forwarded
        }
        Err(e) => {
            warn!(error = %e, from = ?data.from, "Inbound email forward failed");
            RelayOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(html: Option<&str>, text: Option<&str>) -> InboundEmailData {
        InboundEmailData {
            from: Some("Cliente <cliente@shop.test>".to_string()),
            to: None,
            subject: Some("Pedido".to_string()),
            text: text.map(String::from),
            html: html.map(String::from),
        }
    }

    #[test]
    fn first_missing_field_is_reported() {
        let err = ContactRequest {
            nombre: Some("Ana".into()),
            email: Some("ana@shop.test".into()),
            mensaje: Some("  ".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing field: mensaje");
    }

    #[test]
    fn contact_email_escapes_input_and_replies_to_submitter() {
        let submission = ContactSubmission {
            nombre: "<b>Ana</b>".into(),
            email: "ana@shop.test".into(),
            mensaje: "Hola & adiós".into(),
        };
        let email = compose_contact_email("web@shop.test", &["ops@shop.test".to_string()], &submission);

        assert_eq!(email.reply_to.as_deref(), Some("ana@shop.test"));
        assert!(email.html.contains("&lt;b&gt;Ana&lt;/b&gt;"));
        assert!(email.html.contains("Hola &amp; adiós"));
        assert_eq!(email.to, vec!["ops@shop.test"]);
    }

    #[test]
    fn forward_prefers_html_then_text_then_placeholder() {
        let to = ["yo@shop.test".to_string()];

        let email = compose_forward("web@shop.test", &to, &data(Some("<p>rich</p>"), Some("plain")));
        assert!(email.html.contains("<p>rich</p>"));
        assert_eq!(email.subject, "Fwd: Pedido");

        let email = compose_forward("web@shop.test", &to, &data(None, Some("a < b")));
        assert!(email.html.contains("a &lt; b"));

        let email = compose_forward("web@shop.test", &to, &data(Some(""), None));
        assert!(email.html.contains(EMPTY_CONTENT_PLACEHOLDER));
    }
}
