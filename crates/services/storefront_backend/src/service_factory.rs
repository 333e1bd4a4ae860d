// --- File: crates/services/storefront_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds the payment and email clients once at startup from [`AppConfig`]
//! and hands out type-erased handles to the routers.
use std::sync::Arc;
use storefront_common::config_error;
use storefront_common::services::{
    BoxFuture, BoxedError, BoxedNotificationService, CheckoutSessionRequest,
    CheckoutSessionResult, DynNotificationService, DynPaymentService, EmailMessage,
    NotificationResult, NotificationService, PaymentService, ServiceFactory,
};
#[cfg(feature = "stripe")]
use storefront_common::services::BoxedPaymentService;
use storefront_config::{AppConfig, EmailProvider};
use storefront_email::{ResendEmailService, SmtpEmailService};
use tracing::{error, info, warn};

#[cfg(feature = "stripe")]
use storefront_stripe::service::StripePaymentService;

pub struct StorefrontServiceFactory {
    payment_service: Option<DynPaymentService>,
    notification_service: Option<DynNotificationService>,
}

impl StorefrontServiceFactory {
    /// Create a new service factory. A service whose configuration is missing
    /// or incomplete is logged and left out.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            payment_service: build_payment_service(&config),
            notification_service: build_notification_service(&config),
        }
    }

    /// Factory with explicit handles, for tests and embedding.
    pub fn from_services(
        payment_service: Option<DynPaymentService>,
        notification_service: Option<DynNotificationService>,
    ) -> Self {
        Self {
            payment_service,
            notification_service,
        }
    }
}

#[cfg(feature = "stripe")]
fn build_payment_service(config: &AppConfig) -> Option<DynPaymentService> {
    if !config.use_stripe {
        return None;
    }
    let Some(stripe_config) = config.stripe.as_ref() else {
        warn!("⚠️ Stripe is enabled but the [stripe] section is missing");
        return None;
    };
    match StripePaymentService::new(stripe_config) {
        Ok(service) => {
            info!("ℹ️ Stripe payment service initialized");
            Some(Arc::new(BoxedPaymentService(service)))
        }
        Err(e) => {
            error!("❌ Failed to initialize Stripe payment service: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "stripe"))]
fn build_payment_service(_config: &AppConfig) -> Option<DynPaymentService> {
    None
}

fn build_notification_service(config: &AppConfig) -> Option<DynNotificationService> {
    let Some(email_config) = config.email.as_ref() else {
        warn!("⚠️ No [email] section, outgoing email is disabled");
        return None;
    };

    let service: Result<DynNotificationService, String> = match email_config.provider {
        EmailProvider::Resend => config
            .resend
            .as_ref()
            .ok_or_else(|| "the [resend] section is missing".to_string())
            .and_then(|resend| ResendEmailService::new(resend).map_err(|e| e.to_string()))
            .map(|service| Arc::new(BoxedNotificationService(service)) as DynNotificationService),
        EmailProvider::Smtp => config
            .smtp
            .as_ref()
            .ok_or_else(|| "the [smtp] section is missing".to_string())
            .and_then(|smtp| SmtpEmailService::new(smtp).map_err(|e| e.to_string()))
            .map(|service| Arc::new(BoxedNotificationService(service)) as DynNotificationService),
    };

    match service {
        Ok(service) => {
            info!(provider = ?email_config.provider, "ℹ️ Email service initialized");
            Some(service)
        }
        Err(e) => {
            error!(provider = ?email_config.provider, "❌ Failed to initialize email service: {}", e);
            None
        }
    }
}

/// Stands in for a service that could not be built, so the routes of an
/// enabled feature still answer with a configuration error instead of 404.
pub struct UnconfiguredService(pub &'static str);

impl UnconfiguredService {
    fn error(&self) -> BoxedError {
        BoxedError::new(config_error(format!("{} is not configured", self.0)))
    }
}

impl PaymentService for UnconfiguredService {
    type Error = BoxedError;

    fn create_checkout_session(
        &self,
        _request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        Box::pin(async move { Err(self.error()) })
    }
}

impl NotificationService for UnconfiguredService {
    type Error = BoxedError;

    fn send_email(&self, _message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move { Err(self.error()) })
    }
}

impl ServiceFactory for StorefrontServiceFactory {
    fn payment_service(&self) -> Option<DynPaymentService> {
        self.payment_service.clone()
    }

    fn notification_service(&self) -> Option<DynNotificationService> {
        self.notification_service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> Arc<AppConfig> {
        Arc::new(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn unresolved_secrets_leave_services_out() {
        let factory = StorefrontServiceFactory::new(config(json!({
            "server": { "host": "127.0.0.1", "port": 3000 },
            "use_stripe": true,
            "stripe": {
                "secret_key": "secret_from_env",
                "webhook_secret": "secret_from_env",
                "success_url": "https://shop.test/ok",
                "cancel_url": "https://shop.test/cancel"
            },
            "email": { "provider": "resend", "from_address": "tienda@shop.test" },
            "resend": { "api_key": "secret_from_env" }
        })));

        assert!(factory.payment_service().is_none());
        assert!(factory.notification_service().is_none());
    }

    #[tokio::test]
    async fn unconfigured_service_reports_what_is_missing() {
        let err = UnconfiguredService("Email service")
            .send_email(EmailMessage {
                from: "a@shop.test".into(),
                to: vec!["b@shop.test".into()],
                subject: "s".into(),
                html: "h".into(),
                text: None,
                reply_to: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Email service is not configured");
    }

    #[test]
    fn builds_configured_services() {
        let factory = StorefrontServiceFactory::new(config(json!({
            "server": { "host": "127.0.0.1", "port": 3000 },
            "use_stripe": true,
            "stripe": {
                "secret_key": "sk_test_123",
                "webhook_secret": "whsec_test",
                "success_url": "https://shop.test/ok",
                "cancel_url": "https://shop.test/cancel"
            },
            "email": { "provider": "resend", "from_address": "tienda@shop.test" },
            "resend": { "api_key": "re_test" }
        })));

        assert_eq!(factory.payment_service().is_some(), cfg!(feature = "stripe"));
        assert!(factory.notification_service().is_some());
    }
}
