#![allow(dead_code)]

use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use storefront_common::services::{
    BoxFuture, BoxedError, CheckoutSessionRequest, CheckoutSessionResult, EmailMessage,
    NotificationResult, NotificationService, PaymentService,
};
use storefront_config::AppConfig;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

#[derive(Default)]
pub struct FakePayments {
    pub requests: Mutex<Vec<CheckoutSessionRequest>>,
    pub failure: Option<String>,
}

impl PaymentService for FakePayments {
    type Error = BoxedError;

    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request);
            match &self.failure {
                Some(message) => Err(BoxedError(message.clone().into())),
                None => Ok(CheckoutSessionResult {
                    id: "cs_test_123".to_string(),
                    url: "https://checkout.stripe.com/c/pay/cs_test_123".to_string(),
                }),
            }
        })
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationService for RecordingMailer {
    type Error = BoxedError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move {
            if self.fail {
                return Err(BoxedError("Resend API returned 503".to_string().into()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(NotificationResult {
                id: "em_test".to_string(),
                status: "sent".to_string(),
            })
        })
    }
}

pub fn app_config() -> AppConfig {
    serde_json::from_value(json!({
        "server": { "host": "127.0.0.1", "port": 3000 },
        "use_stripe": true,
        "stripe": {
            "secret_key": "sk_test_123",
            "webhook_secret": WEBHOOK_SECRET,
            "success_url": "https://shop.test/pago-exitoso.html?session_id={CHECKOUT_SESSION_ID}",
            "cancel_url": "https://shop.test/tienda.html"
        },
        "email": { "provider": "resend", "from_address": "Tienda VRN <onboarding@resend.dev>" },
        "delivery": {
            "download_base_url": "https://shop.test/descargas",
            "store_name": "Multiservicios VRN"
        }
    }))
    .unwrap()
}

pub fn router(payments: Arc<FakePayments>, mailer: Arc<RecordingMailer>) -> Router {
    storefront_stripe::routes(Arc::new(app_config()), payments, mailer)
}

pub async fn send(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
