// --- File: crates/storefront_fulfillment/src/lib.rs ---

// Declare modules within this crate
pub mod logic;    // Metadata resolution, download links, delivery
pub mod template; // Delivery email body

pub use logic::{
    build_download_links, deliver_purchase, download_url, resolve_purchase, CompletedPurchase,
    DeliveryReport, DownloadLink, FulfillmentError, PurchaseResolution, UNKNOWN_FILE_ID,
};
