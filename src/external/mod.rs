// ABOUTME: External service clients consumed by the recognition pipeline
// ABOUTME: Defines the product/nutrition lookup contract and its implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Product and nutrition catalog access.
//!
//! The core never caches catalog data itself beyond the client-local TTL
//! cache; every scan reads a fresh snapshot through this contract.

/// `OpenFoodFacts` catalog client and mock
pub mod openfoodfacts;

pub use openfoodfacts::{MockCatalogClient, OpenFoodFactsClient, OpenFoodFactsConfig};

use crate::models::NutritionRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to a product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request exceeded the deadline
    #[error("catalog request timed out")]
    Timeout,
    /// Transport-level failure
    #[error("catalog network error: {0}")]
    Network(String),
    /// Non-success HTTP status
    #[error("catalog returned HTTP {status}")]
    Http {
        /// Status code returned by the catalog
        status: u16,
    },
    /// Body did not match the expected shape
    #[error("unparseable catalog response: {0}")]
    InvalidResponse(String),
    /// Client-side rate limit engaged
    #[error("catalog rate limit reached")]
    RateLimited,
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// One product as known to the catalog.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    /// Product name
    pub name: String,
    /// Brand, when known
    pub brand: Option<String>,
    /// Category tags, most general first
    pub categories: Vec<String>,
    /// Declared allergens
    pub allergens: Vec<String>,
    /// Per-100g nutrition facts, when the catalog has them
    pub nutrition: Option<NutritionRecord>,
}

/// Read-only product/nutrition lookup used for barcode resolution and for
/// attaching nutrition to finalized detections.
///
/// `Ok(None)` means "not in catalog" and is a soft outcome; the detection is
/// kept with `nutrition_resolved == false`.
#[async_trait]
pub trait ProductNutritionLookup: Send + Sync {
    /// Look a product up by exact barcode.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on transport or protocol failures.
    async fn resolve_barcode(&self, barcode: &str) -> Result<Option<CatalogProduct>, CatalogError>;

    /// Resolve a free-form label to the best catalog match.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on transport or protocol failures.
    async fn resolve_label(&self, label: &str) -> Result<Option<CatalogProduct>, CatalogError>;
}
