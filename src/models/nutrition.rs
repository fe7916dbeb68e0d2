// ABOUTME: Per-100g canonical nutrition facts with per-serving normalization
// ABOUTME: All amounts are non-negative; construction enforces the invariant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized nutrition facts for one product.
///
/// Amounts are always per 100 g; backends reporting per-serving values must
/// normalize through [`NutritionRecord::from_per_serving`] before storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    /// Energy in kcal per 100 g
    pub calories: f64,
    /// Protein in grams per 100 g
    pub protein_g: f64,
    /// Carbohydrates in grams per 100 g
    pub carbohydrates_g: f64,
    /// Fat in grams per 100 g
    pub fat_g: f64,
    /// Optional micronutrients, name to amount per 100 g
    /// (fiber, sugar, sodium, vitamins; units follow the source catalog)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub micronutrients: BTreeMap<String, f64>,
}

impl NutritionRecord {
    /// Create a record from per-100g macro amounts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeNutrient`] for any negative amount.
    pub fn new(
        calories: f64,
        protein_g: f64,
        carbohydrates_g: f64,
        fat_g: f64,
    ) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("calories", calories),
            ("protein_g", protein_g),
            ("carbohydrates_g", carbohydrates_g),
            ("fat_g", fat_g),
        ] {
            if value < 0.0 {
                return Err(ValidationError::NegativeNutrient { field, value });
            }
        }
        Ok(Self {
            calories,
            protein_g,
            carbohydrates_g,
            fat_g,
            micronutrients: BTreeMap::new(),
        })
    }

    /// Normalize backend-reported per-serving amounts to the per-100g canon.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeNutrient`] for negative amounts or
    /// a non-positive serving size.
    pub fn from_per_serving(
        serving_grams: f64,
        calories: f64,
        protein_g: f64,
        carbohydrates_g: f64,
        fat_g: f64,
    ) -> Result<Self, ValidationError> {
        if serving_grams <= 0.0 {
            return Err(ValidationError::NegativeNutrient {
                field: "serving_grams",
                value: serving_grams,
            });
        }
        let factor = 100.0 / serving_grams;
        Self::new(
            calories * factor,
            protein_g * factor,
            carbohydrates_g * factor,
            fat_g * factor,
        )
    }

    /// Add a micronutrient amount (per 100 g). Negative amounts are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeNutrient`] when `amount` is negative.
    pub fn with_micronutrient(
        mut self,
        name: impl Into<String>,
        amount: f64,
    ) -> Result<Self, ValidationError> {
        if amount < 0.0 {
            return Err(ValidationError::NegativeNutrient {
                field: "micronutrient",
                value: amount,
            });
        }
        self.micronutrients.insert(name.into(), amount);
        Ok(self)
    }

    /// Named micronutrient amount, if present
    #[must_use]
    pub fn micronutrient(&self, name: &str) -> Option<f64> {
        self.micronutrients.get(name).copied()
    }

    /// Scale all amounts from per-100g to an actual portion weight.
    ///
    /// Used for totals and guidance; the stored record stays per-100g.
    #[must_use]
    pub fn scaled_to_weight(&self, grams: f64) -> Self {
        let factor = (grams / 100.0).max(0.0);
        Self {
            calories: self.calories * factor,
            protein_g: self.protein_g * factor,
            carbohydrates_g: self.carbohydrates_g * factor,
            fat_g: self.fat_g * factor,
            micronutrients: self
                .micronutrients
                .iter()
                .map(|(k, v)| (k.clone(), v * factor))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(NutritionRecord::new(52.0, -0.3, 14.0, 0.2).is_err());
        assert!(NutritionRecord::new(52.0, 0.3, 14.0, 0.2).is_ok());
    }

    #[test]
    fn per_serving_normalizes_to_per_100g() {
        // 50 g serving with 100 kcal -> 200 kcal per 100 g
        let record = NutritionRecord::from_per_serving(50.0, 100.0, 5.0, 10.0, 2.0)
            .expect("valid serving");
        assert!((record.calories - 200.0).abs() < 1e-9);
        assert!((record.protein_g - 10.0).abs() < 1e-9);
        assert!((record.carbohydrates_g - 20.0).abs() < 1e-9);
        assert!((record.fat_g - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_serving_is_rejected() {
        assert!(NutritionRecord::from_per_serving(0.0, 100.0, 5.0, 10.0, 2.0).is_err());
    }

    #[test]
    fn scaling_tracks_portion_weight() {
        let record = NutritionRecord::new(52.0, 0.3, 14.0, 0.2).expect("valid record");
        let portion = record.scaled_to_weight(150.0);
        assert!((portion.calories - 78.0).abs() < 1e-9);
    }
}
