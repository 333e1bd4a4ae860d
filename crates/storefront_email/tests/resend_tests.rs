use serde_json::json;
use storefront_common::services::{EmailMessage, NotificationService};
use storefront_config::{ResendConfig, SECRET_MARKER};
use storefront_email::{EmailError, ResendEmailService};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message() -> EmailMessage {
    EmailMessage {
        from: "Tienda VRN <onboarding@resend.dev>".to_string(),
        to: vec!["cliente@shop.test".to_string()],
        subject: "¡Tu descarga está lista!".to_string(),
        html: "<a href=\"https://shop.test/descargas/a.pdf\">a.pdf</a>".to_string(),
        text: None,
        reply_to: None,
    }
}

#[tokio::test]
async fn sends_email_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test_key"))
        .and(body_partial_json(json!({
            "from": "Tienda VRN <onboarding@resend.dev>",
            "to": ["cliente@shop.test"],
            "subject": "¡Tu descarga está lista!"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "em_123" })))
        .expect(1)
        .mount(&server)
        .await;

    let service = ResendEmailService::with_client(reqwest::Client::new(), &server.uri(), "re_test_key");
    let result = service.send_email(message()).await.unwrap();

    assert_eq!(result.id, "em_123");
    assert_eq!(result.status, "sent");
}

#[tokio::test]
async fn surfaces_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "statusCode": 422,
            "name": "validation_error",
            "message": "Invalid `to` field."
        })))
        .mount(&server)
        .await;

    let service = ResendEmailService::with_client(reqwest::Client::new(), &server.uri(), "re_test_key");
    let err = service.send_email(message()).await.unwrap_err();

    match err {
        EmailError::ApiError { status_code, message } => {
            assert_eq!(status_code, 422);
            assert_eq!(message, "Invalid `to` field.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn refuses_to_send_without_recipients() {
    let server = MockServer::start().await;
    let service = ResendEmailService::with_client(reqwest::Client::new(), &server.uri(), "re_test_key");
    let mut email = message();
    email.to.clear();

    assert!(matches!(service.send_email(email).await, Err(EmailError::NoRecipients)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[test]
fn unresolved_api_key_is_a_config_error() {
    let config = ResendConfig {
        api_key: SECRET_MARKER.to_string(),
        api_base: "https://api.resend.com".to_string(),
    };
    assert!(matches!(
        ResendEmailService::new(&config),
        Err(EmailError::ConfigError(_))
    ));
}
