//! Email delivery via an SMTP relay.
//!
//! [`SmtpEmailService`] wraps the `lettre` async SMTP transport (STARTTLS).
//! The transport is built once from [`SmtpConfig`]; no connection is opened
//! until the first send.

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use storefront_common::services::{BoxFuture, EmailMessage, NotificationResult, NotificationService};
use storefront_config::{resolved_secret, SmtpConfig};
use tracing::info;

use crate::error::EmailError;

pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);

        let password = config.password.as_deref().and_then(resolved_secret);
        if let (Some(user), Some(pass)) = (config.username.as_deref(), password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Ok(Self {
            transport: transport_builder.build(),
        })
    }

    /// Assembles the MIME message: HTML only, or plain+HTML alternatives when
    /// a text body is present.
    pub fn build_message(message: &EmailMessage) -> Result<Message, EmailError> {
        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(message.from.parse::<Mailbox>()?)
            .subject(message.subject.clone());
        for recipient in &message.to {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        if let Some(reply_to) = &message.reply_to {
            builder = builder.reply_to(reply_to.parse::<Mailbox>()?);
        }

        let built = match &message.text {
            Some(text) => builder.multipart(MultiPart::alternative_plain_html(
                text.clone(),
                message.html.clone(),
            )),
            None => builder.header(ContentType::TEXT_HTML).body(message.html.clone()),
        };
        built.map_err(|e| EmailError::Build(e.to_string()))
    }
}

impl NotificationService for SmtpEmailService {
    type Error = EmailError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move {
            let email = Self::build_message(&message)?;
            let response = self.transport.send(email).await?;

            info!(recipients = message.to.len(), subject = %message.subject, code = %response.code(), "[SMTP] email sent");
            Ok(NotificationResult {
                id: response.first_line().unwrap_or_default().to_string(),
                status: response.code().to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text: Option<&str>) -> EmailMessage {
        EmailMessage {
            from: "Tienda VRN <tienda@shop.test>".to_string(),
            to: vec!["cliente@shop.test".to_string(), "copia@shop.test".to_string()],
            subject: "Tu descarga".to_string(),
            html: "<p>Hola</p>".to_string(),
            text: text.map(String::from),
            reply_to: Some("soporte@shop.test".to_string()),
        }
    }

    #[test]
    fn builds_html_message_with_all_recipients() {
        let message = SmtpEmailService::build_message(&sample(None)).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("cliente@shop.test"));
        assert!(raw.contains("copia@shop.test"));
        assert!(raw.contains("Reply-To:"));
        assert!(raw.contains("soporte@shop.test"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn builds_alternative_message_when_text_present() {
        let message = SmtpEmailService::build_message(&sample(Some("Hola"))).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn rejects_unparseable_address() {
        let mut email = sample(None);
        email.to = vec!["not-an-email".to_string()];
        let err = SmtpEmailService::build_message(&email).unwrap_err();
        assert!(matches!(err, EmailError::Address(_)));
    }

    #[test]
    fn rejects_empty_recipient_list() {
        let mut email = sample(None);
        email.to.clear();
        assert!(matches!(
            SmtpEmailService::build_message(&email),
            Err(EmailError::NoRecipients)
        ));
    }
}
