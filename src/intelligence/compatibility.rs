// ABOUTME: Pairwise lifestyle compatibility scoring between two user profiles
// ABOUTME: Percentage of comparable types within the intensity tolerance, or InsufficientData
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Compatibility scoring.
//!
//! Purely computational: profiles arrive as validated snapshots, nothing
//! is read or written. Symmetric by construction.

use crate::errors::ValidationError;
use crate::intelligence::lifestyle_constants::{INTENSITY_TOLERANCE, MIN_COMPARABLE_TYPES};
use crate::models::LifestyleProfile;
use serde::{Deserialize, Serialize};

/// Scoring tolerances, defaulting to the catalog constants.
#[derive(Debug, Clone)]
pub struct CompatibilityConfig {
    /// Max intensity gap still counted as compatible
    pub intensity_tolerance: u8,
    /// Minimum comparable types for a numeric percentage
    pub min_comparable_types: usize,
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            intensity_tolerance: INTENSITY_TOLERANCE,
            min_comparable_types: MIN_COMPARABLE_TYPES,
        }
    }
}

/// Outcome of comparing two lifestyle profiles.
///
/// `percentage` is `None` when the profiles share fewer comparable types
/// than the configured minimum; that is a distinguished result state, not
/// an error, and deliberately not a misleading 0% or 100%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    /// Lifestyle types present in both profiles
    pub comparable_count: usize,
    /// Comparable types within the intensity tolerance
    pub compatible_count: usize,
    /// `round(100 * compatible / comparable, 1)`, absent on insufficient data
    pub percentage: Option<f64>,
    /// Mean absolute intensity gap across comparable types, 1 decimal
    pub avg_intensity_difference: Option<f64>,
}

impl CompatibilityScore {
    /// The distinguished insufficient-data state
    #[must_use]
    pub const fn insufficient_data(comparable_count: usize) -> Self {
        Self {
            comparable_count,
            compatible_count: 0,
            percentage: None,
            avg_intensity_difference: None,
        }
    }

    /// Whether too few types were comparable for a numeric percentage
    #[must_use]
    pub const fn is_insufficient_data(&self) -> bool {
        self.percentage.is_none()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score how compatible two users' lifestyles are.
///
/// # Errors
///
/// Returns [`ValidationError`] when either profile is malformed; nothing
/// is scored in that case.
pub fn score_compatibility(
    a: &LifestyleProfile,
    b: &LifestyleProfile,
    config: &CompatibilityConfig,
) -> Result<CompatibilityScore, ValidationError> {
    a.validate()?;
    b.validate()?;

    let intensities_b = b.intensity_by_type();
    let mut comparable = 0_usize;
    let mut compatible = 0_usize;
    let mut total_gap = 0_u32;

    for entry in &a.entries {
        let Some(&intensity_b) = intensities_b.get(entry.lifestyle_type.as_str()) else {
            continue;
        };
        comparable += 1;
        let gap = entry.intensity.abs_diff(intensity_b);
        total_gap += u32::from(gap);
        if gap <= config.intensity_tolerance {
            compatible += 1;
        }
    }

    if comparable < config.min_comparable_types {
        return Ok(CompatibilityScore::insufficient_data(comparable));
    }

    Ok(CompatibilityScore {
        comparable_count: comparable,
        compatible_count: compatible,
        percentage: Some(round1(100.0 * compatible as f64 / comparable as f64)),
        avg_intensity_difference: Some(round1(f64::from(total_gap) / comparable as f64)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_keeps_one_decimal() {
        assert!((round1(33.333_333) - 33.3).abs() < 1e-9);
        assert!((round1(66.666_666) - 66.7).abs() < 1e-9);
    }
}
