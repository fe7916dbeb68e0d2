// ABOUTME: Shared data model for scans, nutrition facts, and user profiles
// ABOUTME: Value objects created, consumed, and discarded per request; no long-lived state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Core data model.
//!
//! Everything here is a value object: created per request, owned by the
//! caller, never cached or mutated by the crate after return.

/// Detections, bounding regions, scan inputs and results
pub mod detection;

/// Per-100g canonical nutrition facts
pub mod nutrition;

/// Lifestyle and preference profiles
pub mod profile;

pub use detection::{BackendKind, BoundingRegion, Detection, ScanInput, ScanResult};
pub use nutrition::NutritionRecord;
pub use profile::{
    DietType, Goal, LifestyleCategory, LifestyleEntry, LifestyleProfile, PreferenceProfile,
};
