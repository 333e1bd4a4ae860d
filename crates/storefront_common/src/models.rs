// --- File: crates/storefront_common/src/models.rs ---

// Types shared by the checkout builder and the delivery side:
// - the validated cart item
// - the metadata format carried through the payment processor
// - the catalog product record

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Metadata key holding the purchase kind.
pub const METADATA_KIND_KEY: &str = "purchase_kind";
/// Metadata key holding the JSON-encoded file list of a cart purchase.
pub const METADATA_FILES_KEY: &str = "file_ids";
/// Metadata key holding the file of a single purchase.
pub const METADATA_FILE_KEY: &str = "file_id";
/// Stripe rejects metadata values longer than this.
pub const METADATA_VALUE_LIMIT: usize = 500;

/// A validated cart line. Prices are integer minor units (centavos).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub price: i64,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseKind {
    Single,
    Cart,
}

impl PurchaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseKind::Single => "single",
            PurchaseKind::Cart => "cart",
        }
    }

    /// `direct` is accepted as an older name for `single`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "single" | "direct" => Some(PurchaseKind::Single),
            "cart" => Some(PurchaseKind::Cart),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("metadata key '{0}' is missing")]
    Missing(&'static str),

    #[error("unknown purchase kind '{0}'")]
    UnknownKind(String),

    #[error("file list is not a valid JSON string array: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("file list is empty")]
    Empty,

    #[error("metadata value for '{key}' is {len} characters, the limit is 500")]
    TooLong { key: &'static str, len: usize },
}

/// What was bought, as carried in the checkout session's metadata.
///
/// The processor only stores string values, so a cart's identifiers travel
/// as a compact JSON array under [`METADATA_FILES_KEY`] while a single
/// purchase stores its identifier verbatim under [`METADATA_FILE_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub kind: PurchaseKind,
    pub file_ids: Vec<String>,
}

impl CheckoutMetadata {
    pub fn single(file_id: Option<String>) -> Self {
        Self {
            kind: PurchaseKind::Single,
            file_ids: file_id.into_iter().collect(),
        }
    }

    pub fn cart(file_ids: Vec<String>) -> Self {
        Self {
            kind: PurchaseKind::Cart,
            file_ids,
        }
    }

    /// Encodes into the processor's metadata map.
    ///
    /// Fails instead of letting the processor truncate a value, since the
    /// metadata is the only record of what was bought.
    pub fn to_metadata(&self) -> Result<BTreeMap<String, String>, MetadataError> {
        let mut map = BTreeMap::new();
        map.insert(METADATA_KIND_KEY.to_string(), self.kind.as_str().to_string());

        let (key, value) = match self.kind {
            PurchaseKind::Cart => (METADATA_FILES_KEY, Some(serde_json::to_string(&self.file_ids)?)),
            PurchaseKind::Single => (METADATA_FILE_KEY, self.file_ids.first().cloned()),
        };
        if let Some(value) = value {
            let len = value.chars().count();
            if len > METADATA_VALUE_LIMIT {
                return Err(MetadataError::TooLong { key, len });
            }
            map.insert(key.to_string(), value);
        }
        Ok(map)
    }

    /// Decodes the map echoed back by the completion webhook.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Result<Self, MetadataError> {
        let kind_str = metadata
            .get(METADATA_KIND_KEY)
            .ok_or(MetadataError::Missing(METADATA_KIND_KEY))?;
        let kind = PurchaseKind::parse(kind_str)
            .ok_or_else(|| MetadataError::UnknownKind(kind_str.clone()))?;

        match kind {
            PurchaseKind::Cart => {
                let raw = metadata
                    .get(METADATA_FILES_KEY)
                    .ok_or(MetadataError::Missing(METADATA_FILES_KEY))?;
                let file_ids: Vec<String> = serde_json::from_str(raw)?;
                if file_ids.is_empty() {
                    return Err(MetadataError::Empty);
                }
                Ok(Self::cart(file_ids))
            }
            PurchaseKind::Single => {
                let file_id = metadata
                    .get(METADATA_FILE_KEY)
                    .filter(|f| !f.trim().is_empty())
                    .ok_or(MetadataError::Missing(METADATA_FILE_KEY))?;
                Ok(Self::single(Some(file_id.clone())))
            }
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProductError {
    #[error("product field '{0}' is required")]
    MissingField(&'static str),

    #[error("product price must not be negative")]
    NegativePrice,
}

/// Catalog record. Persisted and edited by the admin surface; the checkout
/// and webhook flow never reads it.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub description: String,
    pub price_in_cents: i64,
    /// Where the downloadable file is stored.
    pub file_url: String,
    /// Cover image.
    pub image_url: String,
}

impl Product {
    pub fn validate(&self) -> Result<(), ProductError> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("fileUrl", &self.file_url),
            ("imageUrl", &self.image_url),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ProductError::MissingField(*field));
        }
        if self.price_in_cents < 0 {
            return Err(ProductError::NegativePrice);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_hash(map: BTreeMap<String, String>) -> HashMap<String, String> {
        map.into_iter().collect()
    }

    #[test]
    fn cart_metadata_round_trips_in_order() {
        let files = vec!["b.pdf".to_string(), "a.pdf".to_string(), "b.pdf".to_string()];
        let encoded = CheckoutMetadata::cart(files.clone()).to_metadata().unwrap();
        assert_eq!(encoded[METADATA_KIND_KEY], "cart");
        assert_eq!(encoded[METADATA_FILES_KEY], r#"["b.pdf","a.pdf","b.pdf"]"#);

        let decoded = CheckoutMetadata::from_metadata(&to_hash(encoded)).unwrap();
        assert_eq!(decoded.kind, PurchaseKind::Cart);
        assert_eq!(decoded.file_ids, files);
    }

    #[test]
    fn single_metadata_stores_identifier_verbatim() {
        let encoded = CheckoutMetadata::single(Some("guías/01 final.pdf".into()))
            .to_metadata()
            .unwrap();
        assert_eq!(encoded[METADATA_FILE_KEY], "guías/01 final.pdf");

        let decoded = CheckoutMetadata::from_metadata(&to_hash(encoded)).unwrap();
        assert_eq!(decoded, CheckoutMetadata::single(Some("guías/01 final.pdf".into())));
    }

    #[test]
    fn single_without_file_encodes_kind_only() {
        let encoded = CheckoutMetadata::single(None).to_metadata().unwrap();
        assert_eq!(encoded.len(), 1);
        let err = CheckoutMetadata::from_metadata(&to_hash(encoded)).unwrap_err();
        assert!(matches!(err, MetadataError::Missing(METADATA_FILE_KEY)));
    }

    #[test]
    fn direct_is_accepted_as_single() {
        let map = HashMap::from([
            (METADATA_KIND_KEY.to_string(), "direct".to_string()),
            (METADATA_FILE_KEY.to_string(), "01.pdf".to_string()),
        ]);
        let decoded = CheckoutMetadata::from_metadata(&map).unwrap();
        assert_eq!(decoded.kind, PurchaseKind::Single);
        assert_eq!(decoded.file_ids, vec!["01.pdf"]);
    }

    #[test]
    fn corrupt_cart_list_is_reported() {
        let map = HashMap::from([
            (METADATA_KIND_KEY.to_string(), "cart".to_string()),
            (METADATA_FILES_KEY.to_string(), "a.pdf,b.pdf".to_string()),
        ]);
        assert!(matches!(
            CheckoutMetadata::from_metadata(&map),
            Err(MetadataError::Corrupt(_))
        ));
    }

    #[test]
    fn empty_cart_list_is_reported() {
        let map = HashMap::from([
            (METADATA_KIND_KEY.to_string(), "cart".to_string()),
            (METADATA_FILES_KEY.to_string(), "[]".to_string()),
        ]);
        assert!(matches!(CheckoutMetadata::from_metadata(&map), Err(MetadataError::Empty)));
    }

    #[test]
    fn missing_and_unknown_kind_are_reported() {
        assert!(matches!(
            CheckoutMetadata::from_metadata(&HashMap::new()),
            Err(MetadataError::Missing(METADATA_KIND_KEY))
        ));
        let map = HashMap::from([(METADATA_KIND_KEY.to_string(), "gift".to_string())]);
        assert!(matches!(
            CheckoutMetadata::from_metadata(&map),
            Err(MetadataError::UnknownKind(k)) if k == "gift"
        ));
    }

    #[test]
    fn oversized_cart_is_rejected_before_reaching_the_processor() {
        let files: Vec<String> = (0..60).map(|i| format!("archivo-{i:03}.pdf")).collect();
        let err = CheckoutMetadata::cart(files).to_metadata().unwrap_err();
        assert!(matches!(err, MetadataError::TooLong { key: METADATA_FILES_KEY, .. }));
    }

    #[test]
    fn product_validation() {
        let mut product = Product {
            name: "Guía de estudio".into(),
            description: "PDF de 40 páginas".into(),
            price_in_cents: 9900,
            file_url: "https://storage.test/guia.pdf".into(),
            image_url: "https://storage.test/guia.png".into(),
        };
        assert_eq!(product.validate(), Ok(()));

        product.image_url = " ".into();
        assert_eq!(product.validate(), Err(ProductError::MissingField("imageUrl")));

        product.image_url = "https://storage.test/guia.png".into();
        product.price_in_cents = -1;
        assert_eq!(product.validate(), Err(ProductError::NegativePrice));
    }

    #[test]
    fn product_uses_catalog_field_names() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "name": "Plantilla",
            "description": "Excel",
            "priceInCents": 4900,
            "fileUrl": "https://storage.test/p.xlsx",
            "imageUrl": "https://storage.test/p.png"
        }))
        .unwrap();
        assert_eq!(product.price_in_cents, 4900);
    }
}
