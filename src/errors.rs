// ABOUTME: Crate-level error taxonomy for recognition and profile validation
// ABOUTME: Separates caller-facing recognition failures from boundary validation rejections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Unified error types for the scan orchestrator and the compatibility engine.
//!
//! Backend-local failures (timeouts, HTTP errors) live in
//! [`crate::providers::BackendError`] and are recovered inside the
//! orchestrator; only the terminal outcomes below reach callers.

use thiserror::Error;

/// Caller-facing failures of a recognition call.
///
/// A failing backend never surfaces here on its own; the orchestrator
/// degrades it and carries on. These variants are the terminal outcomes.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Every invoked backend errored or timed out. No partial result is
    /// produced: a "successful" scan with zero detections would be
    /// indistinguishable from an empty plate.
    #[error("all {attempted} recognition backend(s) failed")]
    AllBackendsFailed {
        /// Number of backends that were invoked
        attempted: usize,
    },

    /// Backends responded but nothing met the confidence floor. Distinct
    /// from [`RecognitionError::AllBackendsFailed`] so callers can present
    /// "could not identify product" instead of a service error.
    #[error("no product could be identified in the input")]
    NothingRecognized,

    /// No registered backend can handle this input kind.
    #[error("no recognition backend accepts this input: {0}")]
    NoBackendAvailable(String),

    /// The input itself is unusable (malformed barcode payload, empty image).
    #[error("invalid scan input: {0}")]
    InvalidInput(String),
}

/// Boundary rejection of malformed profile or model data.
///
/// The engines assume validated input and never silently clamp; anything
/// out of domain is rejected here before scoring executes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Lifestyle intensity outside the 1-10 domain
    #[error("intensity {intensity} for '{lifestyle_type}' is outside 1-10")]
    IntensityOutOfRange {
        /// Offending lifestyle type name
        lifestyle_type: String,
        /// Reported intensity
        intensity: i64,
    },

    /// Priority must be a positive integer, 1 meaning highest
    #[error("priority {priority} for '{lifestyle_type}' must be >= 1")]
    InvalidPriority {
        /// Offending lifestyle type name
        lifestyle_type: String,
        /// Reported priority
        priority: i64,
    },

    /// At most one entry per lifestyle type in a profile
    #[error("duplicate lifestyle type '{lifestyle_type}' in profile")]
    DuplicateLifestyleType {
        /// Duplicated lifestyle type name
        lifestyle_type: String,
    },

    /// Detection confidence must stay in [0, 1]
    #[error("confidence {value} is outside [0, 1]")]
    ConfidenceOutOfRange {
        /// Reported confidence
        value: f64,
    },

    /// Nutrition facts are per-100g amounts and cannot be negative
    #[error("nutrition field '{field}' is negative: {value}")]
    NegativeNutrient {
        /// Field name
        field: &'static str,
        /// Reported amount
        value: f64,
    },

    /// Daily caloric target outside the supported 800-5000 kcal band
    #[error("caloric target {value} is outside 800-5000 kcal")]
    CaloricTargetOutOfRange {
        /// Reported target
        value: u32,
    },
}
