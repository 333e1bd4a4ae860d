use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use storefront_common::services::{
    BoxFuture, BoxedError, EmailMessage, NotificationResult, NotificationService,
};
use storefront_config::AppConfig;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationService for RecordingMailer {
    type Error = BoxedError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move {
            if self.fail {
                return Err(BoxedError("connection refused".to_string().into()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(NotificationResult {
                id: "em_1".to_string(),
                status: "sent".to_string(),
            })
        })
    }
}

fn config() -> AppConfig {
    serde_json::from_value(json!({
        "server": { "host": "127.0.0.1", "port": 3000 },
        "use_contact": true,
        "email": { "provider": "resend", "from_address": "Tienda VRN <onboarding@resend.dev>" },
        "contact": {
            "from_address": "Formulario Web <onboarding@resend.dev>",
            "operator_addresses": ["ops@shop.test"],
            "inbound_forward_addresses": ["yo@personal.test"]
        }
    }))
    .unwrap()
}

fn app(mailer: Arc<RecordingMailer>) -> Router {
    storefront_contact::routes(Arc::new(config()), mailer)
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_of(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn contact_form_reaches_operators_on_both_routes() {
    for uri in ["/enviar-contacto", "/enviar-formulario"] {
        let mailer = Arc::new(RecordingMailer::default());
        let body = json!({ "nombre": "Ana", "email": "ana@shop.test", "mensaje": "Hola" }).to_string();

        let response = app(mailer.clone()).oneshot(post(uri, body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(json_of(response).await, json!({ "message": "Enviado con éxito." }));
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["ops@shop.test"]);
        assert_eq!(sent[0].from, "Formulario Web <onboarding@resend.dev>");
        assert_eq!(sent[0].reply_to.as_deref(), Some("ana@shop.test"));
        assert_eq!(sent[0].subject, "Nuevo mensaje de contacto de: Ana");
    }
}

#[tokio::test]
async fn english_field_names_are_accepted() {
    let mailer = Arc::new(RecordingMailer::default());
    let body = json!({ "name": "Ann", "email": "ann@shop.test", "message": "Hi" }).to_string();

    let response = app(mailer.clone()).oneshot(post("/enviar-contacto", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn missing_message_is_400_and_sends_nothing() {
    let mailer = Arc::new(RecordingMailer::default());
    let body = json!({ "nombre": "Ana", "email": "ana@shop.test" }).to_string();

    let response = app(mailer.clone()).oneshot(post("/enviar-contacto", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_of(response).await, json!({ "error": "Missing field: mensaje" }));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn malformed_body_is_400() {
    let mailer = Arc::new(RecordingMailer::default());
    let response = app(mailer.clone()).oneshot(post("/enviar-contacto", "nombre=Ana")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_of(response).await["error"].is_string());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn send_failure_is_500() {
    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });
    let body = json!({ "nombre": "Ana", "email": "ana@shop.test", "mensaje": "Hola" }).to_string();

    let response = app(mailer).oneshot(post("/enviar-contacto", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_of(response).await["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn inbound_email_is_forwarded() {
    let mailer = Arc::new(RecordingMailer::default());
    let body = json!({
        "type": "email.received",
        "data": {
            "from": "Cliente <cliente@shop.test>",
            "to": ["soporte@shop.test"],
            "subject": "Mi pedido",
            "text": "No me llegó el archivo"
        }
    })
    .to_string();

    let response = app(mailer.clone()).oneshot(post("/resend-inbound", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await, json!({ "received": true }));
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["yo@personal.test"]);
    assert_eq!(sent[0].subject, "Fwd: Mi pedido");
    assert!(sent[0].html.contains("No me llegó el archivo"));
}

#[tokio::test]
async fn inbound_relay_always_acknowledges() {
    let failing = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });
    let body = json!({ "type": "email.received", "data": { "subject": "x" } }).to_string();
    let response = app(failing).oneshot(post("/resend-inbound", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await, json!({ "received": true }));

    let mailer = Arc::new(RecordingMailer::default());
    let response = app(mailer.clone()).oneshot(post("/resend-inbound", "{{{")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(mailer.sent().is_empty());
}
