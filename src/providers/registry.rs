// ABOUTME: Registry assembling the active recognition backend set from configuration
// ABOUTME: Feature-gated registration; the orchestrator selects by input capability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

use crate::config::ScanConfig;
use crate::external::ProductNutritionLookup;
use crate::models::ScanInput;
use crate::providers::core::RecognitionBackend;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "backend-barcode")]
use crate::providers::barcode::BarcodeCatalogBackend;
#[cfg(feature = "backend-vision")]
use crate::providers::vision::VisionModelBackend;

/// The set of recognition backends available to the orchestrator.
///
/// Built once at startup from [`ScanConfig`]; backends are selected per
/// scan by input capability, never by name.
pub struct BackendRegistry {
    backends: Vec<Arc<dyn RecognitionBackend>>,
}

impl BackendRegistry {
    /// Empty registry
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Assemble the registry from configuration and a catalog client.
    ///
    /// Backends compiled out by feature flags or missing required
    /// configuration are skipped with a log line rather than an error, so
    /// a partially configured deployment still scans with what it has.
    #[must_use]
    pub fn from_config(
        config: &ScanConfig,
        catalog: Arc<dyn ProductNutritionLookup>,
    ) -> Self {
        let mut registry = Self::empty();

        #[cfg(feature = "backend-barcode")]
        registry.register(Arc::new(BarcodeCatalogBackend::new(catalog)));
        #[cfg(not(feature = "backend-barcode"))]
        let _ = catalog;

        #[cfg(feature = "backend-vision")]
        match &config.vision {
            Some(vision_config) => match VisionModelBackend::new(vision_config.clone()) {
                Ok(backend) => registry.register(Arc::new(backend)),
                Err(err) => tracing::warn!(%err, "vision backend misconfigured, skipping"),
            },
            None => info!("vision backend not configured, skipping"),
        }
        #[cfg(not(feature = "backend-vision"))]
        let _ = config;

        let names: Vec<&str> = registry
            .backends
            .iter()
            .map(|b| b.kind().as_str())
            .collect();
        info!(
            count = registry.backends.len(),
            backends = %names.join(", "),
            "recognition backend registry initialized"
        );
        registry
    }

    /// Add a backend
    pub fn register(&mut self, backend: Arc<dyn RecognitionBackend>) {
        self.backends.push(backend);
    }

    /// Backends able to process the given input
    #[must_use]
    pub fn backends_for(&self, input: &ScanInput) -> Vec<Arc<dyn RecognitionBackend>> {
        self.backends
            .iter()
            .filter(|b| b.accepts(input))
            .cloned()
            .collect()
    }

    /// All registered backends
    #[must_use]
    pub fn all(&self) -> &[Arc<dyn RecognitionBackend>] {
        &self.backends
    }
}
