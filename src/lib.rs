// ABOUTME: Main library entry point for the NutriScan food recognition platform
// ABOUTME: Wires recognition backends, the scan orchestrator, and the compatibility engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

#![deny(unsafe_code)]

//! # NutriScan
//!
//! Food recognition orchestration and lifestyle compatibility scoring.
//!
//! The crate turns a photo or barcode of a food item into a merged,
//! confidence-scored [`models::ScanResult`] with per-100g nutrition facts,
//! and scores stored lifestyle/preference profiles into recommendations and
//! pairwise compatibility percentages.
//!
//! ## Architecture
//!
//! - **Providers**: pluggable [`providers::RecognitionBackend`] implementations
//!   (vision model, barcode + catalog lookup, synthetic)
//! - **Scanner**: concurrent fan-out orchestrator with a shared timeout budget
//!   and detection merging
//! - **Intelligence**: pure compatibility scoring, lifestyle recommendations,
//!   and dietary guidance
//! - **External**: product/nutrition catalog client (`OpenFoodFacts`)
//! - **Storage**: collaborator traits for profile reads and scan history writes
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nutriscan::config::ScanConfig;
//! use nutriscan::external::MockCatalogClient;
//! use nutriscan::models::ScanInput;
//! use nutriscan::providers::BackendRegistry;
//! use nutriscan::scanner::Scanner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::from_env();
//! let catalog = Arc::new(MockCatalogClient::new());
//! let registry = BackendRegistry::from_config(&config, catalog.clone());
//! let scanner = Scanner::new(registry, catalog, config);
//!
//! let input = ScanInput::barcode("4000417025005")?;
//! let result = scanner.recognize(&input, None).await?;
//! println!("{} item(s), confidence {:.2}", result.detections.len(), result.overall_confidence);
//! # Ok(())
//! # }
//! ```

/// Scan orchestration and engine configuration
pub mod config;

/// Crate-level error taxonomy
pub mod errors;

/// Product and nutrition catalog clients
pub mod external;

/// Compatibility scoring, recommendations, and dietary guidance
pub mod intelligence;

/// Logging configuration and tracing setup
pub mod logging;

/// Shared data model (detections, nutrition, profiles)
pub mod models;

/// Pluggable recognition backends
pub mod providers;

/// Recognition orchestrator and detection merging
pub mod scanner;

/// Profile-backed service facade over the intelligence engines
pub mod services;

/// Collaborator traits for profile storage and scan history
pub mod storage;

pub use errors::{RecognitionError, ValidationError};
pub use models::{Detection, NutritionRecord, ScanInput, ScanResult};
pub use scanner::{ScanService, Scanner};
