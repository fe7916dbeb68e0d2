// ABOUTME: Dietary guidance combining a scan result with a user's preference profile
// ABOUTME: Allergen flags, liked/disliked matches, rule-based health scores and advice
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Dietary guidance.
//!
//! Takes a finalized scan and a preference profile and produces the
//! personalized layer: allergen warnings, liked/disliked matches, a 1-10
//! health score per detection, and a short advice line. All of it is rule
//! scoring over resolved nutrition, not inference.

use crate::models::{Detection, PreferenceProfile, ScanResult};
use serde::{Deserialize, Serialize};

/// Health score bounds
const HEALTH_SCORE_MIN: f64 = 1.0;
const HEALTH_SCORE_MAX: f64 = 10.0;

/// Per-category base health scores; unknown categories start neutral.
const CATEGORY_BASE_SCORES: &[(&str, f64)] = &[
    ("fruit", 8.5),
    ("vegetable", 9.0),
    ("protein", 7.5),
    ("grain", 6.5),
    ("dairy", 6.0),
];
const UNKNOWN_CATEGORY_SCORE: f64 = 5.0;

/// Guidance for one detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionGuidance {
    /// Detection label the guidance refers to
    pub label: String,
    /// Allergens from the user's avoid-list matching this item
    pub allergen_hits: Vec<String>,
    /// The user has this product on their liked list
    pub liked: bool,
    /// The user has this product on their disliked list
    pub disliked: bool,
    /// Rule-scored healthiness, 1.0-10.0
    pub health_score: f64,
    /// Short advice line
    pub advice: String,
}

/// Guidance for a whole scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanGuidance {
    /// Per-detection guidance, in scan order
    pub items: Vec<DetectionGuidance>,
    /// Total calories across detections with resolved nutrition and a
    /// weight estimate; `None` when nothing was resolvable
    pub total_calories: Option<f64>,
    /// How the scan relates to the user's daily caloric target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caloric_context: Option<String>,
}

/// Evaluate a scan against a user's preferences.
#[must_use]
pub fn evaluate_scan(scan: &ScanResult, prefs: &PreferenceProfile) -> ScanGuidance {
    let items: Vec<DetectionGuidance> = scan
        .detections
        .iter()
        .map(|d| evaluate_detection(d, prefs))
        .collect();

    let mut total_calories = None;
    for detection in &scan.detections {
        if let (Some(nutrition), Some(weight)) =
            (&detection.nutrition, detection.estimated_weight_grams)
        {
            let portion = nutrition.scaled_to_weight(weight);
            total_calories = Some(total_calories.unwrap_or(0.0) + portion.calories);
        }
    }

    let caloric_context = match (total_calories, prefs.caloric_target) {
        (Some(total), Some(target)) => {
            let share = 100.0 * total / f64::from(target);
            Some(format!(
                "This scan covers about {share:.0}% of your {target} kcal daily target"
            ))
        }
        _ => None,
    };

    ScanGuidance {
        items,
        total_calories,
        caloric_context,
    }
}

fn evaluate_detection(detection: &Detection, prefs: &PreferenceProfile) -> DetectionGuidance {
    let label_lower = detection.label.to_lowercase();
    let allergen_hits: Vec<String> = prefs
        .allergens
        .iter()
        .filter(|allergen| fuzzy_contains(&label_lower, allergen))
        .cloned()
        .collect();

    DetectionGuidance {
        label: detection.label.clone(),
        allergen_hits,
        liked: prefs
            .liked_products
            .iter()
            .any(|p| fuzzy_contains(&label_lower, p)),
        disliked: prefs
            .disliked_products
            .iter()
            .any(|p| fuzzy_contains(&label_lower, p)),
        health_score: health_score(detection),
        advice: advice_line(detection),
    }
}

/// Case-insensitive substring match in either direction, so "banana"
/// matches "Banana Brand X" and vice versa.
fn fuzzy_contains(label_lower: &str, preference: &str) -> bool {
    let pref_lower = preference.trim().to_lowercase();
    if pref_lower.is_empty() {
        return false;
    }
    label_lower.contains(&pref_lower) || pref_lower.contains(label_lower)
}

/// Rule-scored healthiness on a 1-10 scale.
///
/// Category sets the base; fiber and protein add, dense calories and fat
/// subtract. Amounts are portion totals when a weight estimate exists,
/// per-100g otherwise.
#[must_use]
pub fn health_score(detection: &Detection) -> f64 {
    let base = detection
        .category
        .as_deref()
        .map(str::to_lowercase)
        .and_then(|category| {
            CATEGORY_BASE_SCORES
                .iter()
                .find(|(name, _)| category.contains(name))
                .map(|(_, score)| *score)
        })
        .unwrap_or(UNKNOWN_CATEGORY_SCORE);

    let Some(nutrition) = &detection.nutrition else {
        return base.clamp(HEALTH_SCORE_MIN, HEALTH_SCORE_MAX);
    };
    let amounts = detection
        .estimated_weight_grams
        .map_or_else(|| nutrition.clone(), |w| nutrition.scaled_to_weight(w));

    let mut score = base;
    if amounts.micronutrients.get("fiber").copied().unwrap_or(0.0) > 3.0 {
        score += 0.5;
    }
    if amounts.protein_g > 10.0 {
        score += 0.5;
    }
    if amounts.calories > 400.0 {
        score -= 1.0;
    }
    if amounts.fat_g > 15.0 {
        score -= 0.5;
    }
    (score * 10.0).round() / 10.0
}

fn advice_line(detection: &Detection) -> String {
    let label = &detection.label;
    let category = detection
        .category
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let calories = detection
        .nutrition
        .as_ref()
        .map(|n| n.calories)
        .unwrap_or_default();
    let protein = detection
        .nutrition
        .as_ref()
        .map(|n| n.protein_g)
        .unwrap_or_default();

    if category.contains("fruit") {
        format!("{label} is rich in vitamins and fiber; its calories come mainly from natural sugars")
    } else if category.contains("protein") || protein > 15.0 {
        format!("{label} provides {protein:.0}g of protein per 100g to help maintain muscle")
    } else if category.contains("grain") {
        format!("{label} provides energy through carbohydrates; pair it with protein for balance")
    } else if detection.nutrition.is_some() {
        format!("{label} has {calories:.0} kcal per 100g; mind the portion size against your daily goals")
    } else {
        format!("No nutrition data found for {label}; log it manually if you track intake")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackendKind, Detection, NutritionRecord};

    fn banana() -> Detection {
        Detection::new("banana", 0.9, BackendKind::Vision)
            .expect("valid")
            .with_category("fruit")
            .with_nutrition(NutritionRecord::new(89.0, 1.1, 23.0, 0.3).expect("valid"))
    }

    #[test]
    fn health_score_stays_in_bounds() {
        let score = health_score(&banana());
        assert!((HEALTH_SCORE_MIN..=HEALTH_SCORE_MAX).contains(&score));
        assert!(score > 8.0, "fruit should score high, got {score}");
    }

    #[test]
    fn fuzzy_match_works_both_directions() {
        assert!(fuzzy_contains("banana brand x", "banana"));
        assert!(fuzzy_contains("milk", "oat milk"));
        assert!(!fuzzy_contains("banana", "peanut"));
        assert!(!fuzzy_contains("banana", "  "));
    }
}
