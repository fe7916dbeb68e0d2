// ABOUTME: Personalization and compatibility engine over lifestyle and preference profiles
// ABOUTME: Pure computation on validated snapshots; no I/O, no shared state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Intelligence layer.
//!
//! Everything here is synchronous and side-effect-free: profiles arrive
//! as read-only snapshots from the profile store and results are value
//! objects. Malformed input is rejected at the boundary with
//! [`crate::errors::ValidationError`]; the engines never clamp.

/// Pairwise compatibility scoring
pub mod compatibility;

/// Dietary guidance for a scan against a preference profile
pub mod guidance;

/// Catalog, tables, and tolerances as data
pub mod lifestyle_constants;

/// Goal-based and balance-based recommendations
pub mod recommendation_engine;

pub use compatibility::{score_compatibility, CompatibilityConfig, CompatibilityScore};
pub use guidance::{evaluate_scan, DetectionGuidance, ScanGuidance};
pub use lifestyle_constants::{LifestyleType, INTENSITY_TOLERANCE, LIFESTYLE_TYPES};
pub use recommendation_engine::{
    ProfileSuggestion, RecommendationConfig, RecommendationEngine, SuggestionKind,
};
