// --- File: crates/services/storefront_backend/src/router.rs ---
use axum::{routing::get, Router};
use http::{HeaderValue, Method};
use storefront_config::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app_state::AppState;
#[cfg(any(feature = "stripe", feature = "contact"))]
use crate::service_factory::UnconfiguredService;
#[cfg(any(feature = "stripe", feature = "contact"))]
use std::sync::Arc;
#[cfg(any(feature = "stripe", feature = "contact"))]
use storefront_common::services::DynNotificationService;
#[cfg(any(feature = "stripe", feature = "contact"))]
use tracing::warn;

pub const BANNER: &str = "Servidor de la tienda funcionando";

#[cfg(any(feature = "stripe", feature = "contact"))]
fn notifier_or_unconfigured(state: &AppState) -> DynNotificationService {
    state.service_factory.notification_service().unwrap_or_else(|| {
        warn!("⚠️ Email service unavailable, email-sending routes will answer 500");
        Arc::new(UnconfiguredService("Email service"))
    })
}

/// Builds the full application router from the enabled features.
pub fn build_router(state: &AppState) -> Router {
    #[allow(unused_mut)] // mutated only when a feature is compiled in
    let mut router = Router::new().route("/", get(|| async { BANNER }));

    #[cfg(feature = "stripe")]
    {
        if state.config.use_stripe {
            let payment_service = state.service_factory.payment_service().unwrap_or_else(|| {
                warn!("⚠️ Stripe payment service unavailable, checkout will answer 500");
                Arc::new(UnconfiguredService("Stripe payment service"))
            });
            let stripe_router = storefront_stripe::routes(
                state.config.clone(),
                payment_service,
                notifier_or_unconfigured(state),
            );
            router = router.merge(stripe_router);
            info!("ℹ️ Stripe routes mounted: /crear-sesion-pago, /webhook");
        }
    }

    #[cfg(feature = "contact")]
    {
        if state.config.use_contact {
            let contact_router =
                storefront_contact::routes(state.config.clone(), notifier_or_unconfigured(state));
            router = router.merge(contact_router);
            info!("ℹ️ Contact routes mounted: /enviar-contacto, /enviar-formulario, /resend-inbound");
        }
    }

    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "contact")]
        use storefront_contact::doc::ContactApiDoc;
        #[cfg(feature = "stripe")]
        use storefront_stripe::doc::StripeApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Storefront API",
                version = "0.1.0",
                description = "Checkout, purchase delivery and contact endpoints"
            ),
            components(),
            tags((name = "Storefront", description = "Core service endpoints")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)]
        let mut openapi_doc = ApiDoc::openapi();
        #[cfg(feature = "stripe")]
        openapi_doc.merge(StripeApiDoc::openapi());
        #[cfg(feature = "contact")]
        openapi_doc.merge(ContactApiDoc::openapi());

        info!("📖 Swagger UI at /docs");
        router = router.merge(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi_doc));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
}

/// Restricts CORS to the storefront origin when one is configured.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = config
        .frontend_url
        .as_deref()
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .and_then(|url| HeaderValue::from_str(url).ok());

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}
