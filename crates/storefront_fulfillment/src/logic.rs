// --- File: crates/storefront_fulfillment/src/logic.rs ---

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::collections::HashMap;
use storefront_common::{
    external_service_error, config_error, CheckoutMetadata, HttpStatusCode, MetadataError,
    NotificationService, StorefrontError,
};
use storefront_config::AppConfig;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::template::compose_delivery_email;

/// Stands in for the purchased files when the metadata cannot be read.
pub const UNKNOWN_FILE_ID: &str = "unknown";

// --- Error Handling for Fulfillment ---
#[derive(Error, Debug)]
pub enum FulfillmentError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to send download email: {0}")]
    DeliveryFailed(String),
}

impl HttpStatusCode for FulfillmentError {
    fn status_code(&self) -> u16 {
        500
    }
}

impl From<FulfillmentError> for StorefrontError {
    fn from(err: FulfillmentError) -> Self {
        match err {
            FulfillmentError::ConfigError(msg) => config_error(msg),
            FulfillmentError::DeliveryFailed(msg) => external_service_error("Email provider", msg),
        }
    }
}

/// What the session's metadata says was bought.
#[derive(Debug)]
pub enum PurchaseResolution {
    Files(Vec<String>),
    /// The metadata was missing or unreadable. Delivery still goes out, with
    /// the placeholder identifier and a support notice.
    Unresolved(MetadataError),
}

impl PurchaseResolution {
    pub fn file_ids(&self) -> Vec<String> {
        match self {
            PurchaseResolution::Files(ids) => ids.clone(),
            PurchaseResolution::Unresolved(_) => vec![UNKNOWN_FILE_ID.to_string()],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PurchaseResolution::Unresolved(_))
    }
}

/// Resolves the metadata echoed back by the completion event. Never fails.
pub fn resolve_purchase(metadata: Option<&HashMap<String, String>>) -> PurchaseResolution {
    let decoded = match metadata {
        Some(map) => CheckoutMetadata::from_metadata(map),
        None => Err(MetadataError::Missing("metadata")),
    };

    match decoded {
        Ok(meta) if !meta.file_ids.is_empty() => PurchaseResolution::Files(meta.file_ids),
        Ok(_) => {
            warn!("Checkout metadata names no files, using placeholder");
            PurchaseResolution::Unresolved(MetadataError::Empty)
        }
        Err(e) => {
            warn!(error = %e, "Checkout metadata unreadable, using placeholder");
            PurchaseResolution::Unresolved(e)
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DownloadLink {
    pub file_id: String,
    pub url: String,
}

// Characters escaped inside one path segment; non-ASCII is always escaped
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Joins base and identifier with exactly one slash, percent-encoding each
/// segment of the identifier. The file is not checked for existence.
pub fn download_url(base_url: &str, file_id: &str) -> String {
    let path = file_id
        .trim_start_matches('/')
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

pub fn build_download_links(base_url: &str, file_ids: &[String]) -> Vec<DownloadLink> {
    file_ids
        .iter()
        .map(|id| DownloadLink {
            file_id: id.clone(),
            url: download_url(base_url, id),
        })
        .collect()
}

/// The parts of a completed checkout session that delivery needs.
#[derive(Debug, Clone, Default)]
pub struct CompletedPurchase {
    pub session_id: String,
    /// Taken from the session object, never from client input.
    pub customer_email: String,
    pub customer_name: Option<String>,
    /// Minor units.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeliveryReport {
    pub email_id: String,
    pub links: Vec<DownloadLink>,
    pub placeholder: bool,
}

/// Resolves the purchased files, builds their links and emails them to the
/// purchaser. Exactly one send is attempted.
pub async fn deliver_purchase<N>(
    config: &AppConfig,
    notifier: &N,
    purchase: &CompletedPurchase,
) -> Result<DeliveryReport, FulfillmentError>
where
    N: NotificationService + ?Sized,
{
    let delivery = config
        .delivery
        .as_ref()
        .ok_or_else(|| FulfillmentError::ConfigError("Missing [delivery] configuration".to_string()))?;
    let sender = config
        .sender_address(delivery.from_address.as_deref())
        .ok_or_else(|| FulfillmentError::ConfigError("No sender address configured for delivery".to_string()))?;

    let resolution = resolve_purchase(purchase.metadata.as_ref());
    let links = build_download_links(&delivery.download_base_url, &resolution.file_ids());
    let message = compose_delivery_email(delivery, sender, purchase, &links, resolution.is_placeholder());

    match notifier.send_email(message).await {
        Ok(result) => {
            info!(
                session_id = %purchase.session_id,
                files = links.len(),
                placeholder = resolution.is_placeholder(),
                email_id = %result.id,
                "Download email sent"
            );
            Ok(DeliveryReport {
                email_id: result.id,
                links,
                placeholder: resolution.is_placeholder(),
            })
        }
        Err(e) => {
            error!(session_id = %purchase.session_id, error = %e, "Download email failed");
            Err(FulfillmentError::DeliveryFailed(e.to_string()))
        }
    }
}
