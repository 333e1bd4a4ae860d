// --- File: crates/storefront_email/src/resend.rs ---
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storefront_common::services::{BoxFuture, EmailMessage, NotificationResult, NotificationService};
use storefront_common::HTTP_CLIENT;
use storefront_config::{resolved_secret, ResendConfig};
use tracing::{error, info};

use crate::error::EmailError;

/// Body of `POST /emails`.
#[derive(Serialize, Debug)]
struct ResendSendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
struct ResendSendResponse {
    id: String,
}

/// Sends email through the Resend HTTP API.
pub struct ResendEmailService {
    client: Client,
    api_base: String,
    api_key: String,
}

impl ResendEmailService {
    /// Builds the service from config; fails when the API key was never resolved.
    pub fn new(config: &ResendConfig) -> Result<Self, EmailError> {
        let api_key = resolved_secret(&config.api_key)
            .ok_or_else(|| EmailError::ConfigError("RESEND_API_KEY is not set".to_string()))?;
        Ok(Self::with_client(HTTP_CLIENT.clone(), &config.api_base, api_key))
    }

    pub fn with_client(client: Client, api_base: &str, api_key: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl NotificationService for ResendEmailService {
    type Error = EmailError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move {
            if message.to.is_empty() {
                return Err(EmailError::NoRecipients);
            }

            let body = ResendSendRequest {
                from: &message.from,
                to: &message.to,
                subject: &message.subject,
                html: &message.html,
                text: message.text.as_deref(),
                reply_to: message.reply_to.as_deref(),
            };
            let api_url = format!("{}/emails", self.api_base);

            let response = self
                .client
                .post(&api_url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let body_text = response.text().await?;

            if status.is_success() {
                let sent: ResendSendResponse = serde_json::from_str(&body_text)?;
                info!(email_id = %sent.id, recipients = message.to.len(), subject = %message.subject, "[Resend] email accepted");
                Ok(NotificationResult {
                    id: sent.id,
                    status: "sent".to_string(),
                })
            } else {
                let error_message = match serde_json::from_str::<serde_json::Value>(&body_text) {
                    Ok(json_body) => json_body
                        .get("message")
                        .and_then(|m| m.as_str())
                        .unwrap_or(&body_text)
                        .to_string(),
                    Err(_) => body_text,
                };
                error!(status = %status, message = %error_message, "[Resend] send failed");
                Err(EmailError::ApiError {
                    status_code: status.as_u16(),
                    message: error_message,
                })
            }
        })
    }
}
