// --- File: crates/storefront_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::error::{HttpStatusCode, StorefrontError};

// Include the client module
pub mod client;

/// The `{ "error": "<message>" }` body every JSON route uses for failures.
pub fn error_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "error": message.into() }))
}

/// Escapes text for interpolation into an HTML email body.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Extension trait for StorefrontError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for StorefrontError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status_code, error_body(self.to_string())).into_response()
    }
}

/// Implement IntoResponse for StorefrontError to make it easier to use in Axum handlers.
impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::validation_error;

    #[tokio::test]
    async fn renders_error_as_json_with_status() {
        let response = validation_error("Missing field: mensaje").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Hola" & 'adiós'</b>"#),
            "&lt;b&gt;&quot;Hola&quot; &amp; &#39;adiós&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn error_body_shape() {
        let Json(body) = error_body("boom");
        assert_eq!(body, json!({ "error": "boom" }));
    }
}
