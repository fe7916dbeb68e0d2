// ABOUTME: Lifestyle recommendation engine over preference and lifestyle profiles
// ABOUTME: Goal-table lookups plus rule-scored category balance suggestions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Recommendation engine.
//!
//! Two rule-based passes, no machine learning: a static goal table drives
//! lifestyle suggestions for a preference profile, and a balance pass
//! flags empty or low-engagement categories on a lifestyle profile.

use crate::errors::ValidationError;
use crate::intelligence::lifestyle_constants::{
    lifestyle_type, recommendations_for_goal, LifestyleType, LOW_INTENSITY_THRESHOLD,
};
use crate::models::{LifestyleCategory, LifestyleProfile, PreferenceProfile};
use serde::{Deserialize, Serialize};

/// Rule weights for profile suggestions.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// Average category intensity below which engagement suggestions fire
    pub low_intensity_threshold: f64,
    /// Rule score for a category with no entries at all
    pub missing_category_score: f64,
    /// Rule score for a present but low-intensity category
    pub low_intensity_score: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            low_intensity_threshold: LOW_INTENSITY_THRESHOLD,
            missing_category_score: 1.0,
            low_intensity_score: 0.5,
        }
    }
}

/// Why a profile suggestion fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// The category has no entries at all
    MissingCategory,
    /// The category is present but engagement is low
    IncreaseEngagement,
}

/// One ranked suggestion for a lifestyle profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSuggestion {
    /// Category the suggestion is about
    pub category: LifestyleCategory,
    /// Which rule fired
    pub kind: SuggestionKind,
    /// Rule score used for ranking, higher first
    pub score: f64,
    /// Human-readable suggestion text
    pub message: String,
}

/// Rule-based recommendation engine.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    /// Engine with default rule weights
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom rule weights
    #[must_use]
    pub const fn with_config(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Ordered lifestyle recommendations for a user's goal.
    ///
    /// Looks the goal up in the static table and keeps table order,
    /// intersected with `active_types` (the currently offered lifestyle
    /// set). An unset or unrecognized goal yields an empty list, never an
    /// error.
    #[must_use]
    pub fn recommend_lifestyles<S: AsRef<str>>(
        &self,
        prefs: &PreferenceProfile,
        active_types: &[S],
    ) -> Vec<&'static LifestyleType> {
        let Some(goal) = prefs.goal else {
            return Vec::new();
        };
        recommendations_for_goal(goal)
            .iter()
            .filter(|&&name| active_types.iter().any(|a| a.as_ref() == name))
            .filter_map(|name| lifestyle_type(name))
            .collect()
    }

    /// Ranked balance suggestions for a lifestyle profile.
    ///
    /// Flags categories the user has zero entries in, and categories whose
    /// average intensity falls below the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed profile; nothing is
    /// scored in that case.
    pub fn recommend_for_profile(
        &self,
        profile: &LifestyleProfile,
    ) -> Result<Vec<ProfileSuggestion>, ValidationError> {
        profile.validate()?;

        let mut suggestions = Vec::new();
        for category in LifestyleCategory::ALL {
            let intensities: Vec<f64> = profile
                .entries_in(category)
                .map(|e| f64::from(e.intensity))
                .collect();

            if intensities.is_empty() {
                suggestions.push(ProfileSuggestion {
                    category,
                    kind: SuggestionKind::MissingCategory,
                    score: self.config.missing_category_score,
                    message: format!("Add a {category} preference to round out your profile"),
                });
                continue;
            }

            let average = intensities.iter().sum::<f64>() / intensities.len() as f64;
            if average < self.config.low_intensity_threshold {
                suggestions.push(ProfileSuggestion {
                    category,
                    kind: SuggestionKind::IncreaseEngagement,
                    score: self.config.low_intensity_score,
                    message: format!(
                        "Engagement with your {category} preferences is low, consider leaning in"
                    ),
                });
            }
        }

        // Stable sort keeps canonical category order within equal scores.
        suggestions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(suggestions)
    }
}
