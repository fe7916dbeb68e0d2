// ABOUTME: Barcode recognition backend resolving payloads against the product catalog
// ABOUTME: Catalog hits become confidence-1.0 detections with nutrition attached
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Barcode + catalog backend.
//!
//! A barcode payload is an exact product-catalog key, so a hit yields a
//! single detection at confidence 1.0 with nutrition already attached.
//! A miss is a soft outcome (zero detections), not a backend failure: the
//! barcode was read fine, the catalog just does not know the product.

use crate::external::ProductNutritionLookup;
use crate::models::{BackendKind, Detection, ScanInput};
use crate::providers::core::RecognitionBackend;
use crate::providers::errors::BackendError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Catalog-match confidence. An exact barcode hit derives from the product
/// database, not visual inference, so it carries full certainty.
const CATALOG_MATCH_CONFIDENCE: f64 = 1.0;

/// Recognition backend for decoded barcode payloads.
pub struct BarcodeCatalogBackend {
    catalog: Arc<dyn ProductNutritionLookup>,
}

impl BarcodeCatalogBackend {
    /// Create a backend over a catalog client
    #[must_use]
    pub fn new(catalog: Arc<dyn ProductNutritionLookup>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl RecognitionBackend for BarcodeCatalogBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Barcode
    }

    fn accepts(&self, input: &ScanInput) -> bool {
        input.is_barcode()
    }

    async fn detect(
        &self,
        input: &ScanInput,
        deadline: Duration,
    ) -> Result<Vec<Detection>, BackendError> {
        let ScanInput::Barcode(code) = input else {
            return Ok(Vec::new());
        };

        let lookup = self.catalog.resolve_barcode(code);
        let product = tokio::time::timeout(deadline, lookup)
            .await
            .map_err(|_| BackendError::Timeout {
                backend: BackendKind::Barcode,
            })??;

        let Some(product) = product else {
            debug!(barcode = %code, "barcode not found in catalog");
            return Ok(Vec::new());
        };

        info!(barcode = %code, product = %product.name, "catalog match");
        let label = if product.name.is_empty() {
            format!("product {code}")
        } else {
            product.name.clone()
        };
        let mut detection = Detection::new(label, CATALOG_MATCH_CONFIDENCE, BackendKind::Barcode)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        if let Some(category) = product.categories.first() {
            detection = detection.with_category(category.clone());
        }
        if let Some(nutrition) = product.nutrition {
            detection = detection.with_nutrition(nutrition);
        }
        Ok(vec![detection])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{CatalogProduct, MockCatalogClient};
    use crate::models::NutritionRecord;

    fn banana_product() -> CatalogProduct {
        CatalogProduct {
            name: "Banana".to_owned(),
            brand: None,
            categories: vec!["fruit".to_owned()],
            allergens: Vec::new(),
            nutrition: NutritionRecord::new(89.0, 1.1, 23.0, 0.3).ok(),
        }
    }

    #[tokio::test]
    async fn catalog_hit_yields_full_confidence_detection() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog.insert_barcode("4000417025005", banana_product()).await;
        let backend = BarcodeCatalogBackend::new(catalog);

        let input = ScanInput::barcode("4000417025005").expect("valid barcode");
        let detections = backend
            .detect(&input, Duration::from_secs(5))
            .await
            .expect("lookup succeeds");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "Banana");
        assert!((detections[0].confidence - 1.0).abs() < 1e-9);
        assert!(detections[0].nutrition_resolved);
        assert!(detections[0].bounding_region.is_none());
    }

    #[tokio::test]
    async fn catalog_miss_is_zero_detections_not_an_error() {
        let backend = BarcodeCatalogBackend::new(Arc::new(MockCatalogClient::new()));
        let input = ScanInput::barcode("00000000").expect("valid barcode");
        let detections = backend
            .detect(&input, Duration::from_secs(5))
            .await
            .expect("miss is soft");
        assert!(detections.is_empty());
    }

    #[tokio::test]
    async fn image_input_is_not_accepted() {
        let backend = BarcodeCatalogBackend::new(Arc::new(MockCatalogClient::new()));
        let input = ScanInput::image(vec![1, 2, 3], "image/jpeg").expect("valid image");
        assert!(!backend.accepts(&input));
    }
}
