// ABOUTME: Lifestyle and preference profile value objects with boundary validation
// ABOUTME: Profiles are read-only snapshots loaded from the profile store per call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Intensity domain for lifestyle entries, inclusive
pub const INTENSITY_MIN: u8 = 1;
/// Upper bound of the intensity domain, inclusive
pub const INTENSITY_MAX: u8 = 10;

const CALORIC_TARGET_MIN: u32 = 800;
const CALORIC_TARGET_MAX: u32 = 5000;

/// The four lifestyle categories, exactly as persisted by the profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifestyleCategory {
    /// Physical activity level
    Activity,
    /// Daily schedule preferences
    Schedule,
    /// Social eating habits
    Social,
    /// Health focus areas
    Health,
}

impl LifestyleCategory {
    /// All categories in canonical order
    pub const ALL: [Self; 4] = [Self::Activity, Self::Schedule, Self::Social, Self::Health];

    /// Category name as persisted
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Schedule => "schedule",
            Self::Social => "social",
            Self::Health => "health",
        }
    }
}

impl std::fmt::Display for LifestyleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lifestyle preference held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifestyleEntry {
    /// Lifestyle type name, e.g. "moderately-active"
    pub lifestyle_type: String,
    /// Category the type belongs to
    pub category: LifestyleCategory,
    /// Positive integer, 1 meaning highest priority; no uniqueness required
    pub priority: u32,
    /// How strongly the preference applies, integer 1-10
    pub intensity: u8,
}

/// All lifestyle preferences of one user.
///
/// The profile store enforces at-most-one entry per lifestyle type;
/// [`LifestyleProfile::validate`] re-checks that assumption at the engine
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifestyleProfile {
    /// Owning user
    pub user_id: Uuid,
    /// Entries, in store order
    pub entries: Vec<LifestyleEntry>,
}

impl LifestyleProfile {
    /// Create a profile from entries.
    #[must_use]
    pub const fn new(user_id: Uuid, entries: Vec<LifestyleEntry>) -> Self {
        Self { user_id, entries }
    }

    /// Reject malformed profiles before any scoring executes.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for intensity outside 1-10, priority 0,
    /// or duplicate lifestyle types. The engine never clamps; out-of-domain
    /// values are rejected outright.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !(INTENSITY_MIN..=INTENSITY_MAX).contains(&entry.intensity) {
                return Err(ValidationError::IntensityOutOfRange {
                    lifestyle_type: entry.lifestyle_type.clone(),
                    intensity: i64::from(entry.intensity),
                });
            }
            if entry.priority == 0 {
                return Err(ValidationError::InvalidPriority {
                    lifestyle_type: entry.lifestyle_type.clone(),
                    priority: i64::from(entry.priority),
                });
            }
            if !seen.insert(entry.lifestyle_type.as_str()) {
                return Err(ValidationError::DuplicateLifestyleType {
                    lifestyle_type: entry.lifestyle_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Intensity keyed by lifestyle type name
    #[must_use]
    pub fn intensity_by_type(&self) -> HashMap<&str, u8> {
        self.entries
            .iter()
            .map(|e| (e.lifestyle_type.as_str(), e.intensity))
            .collect()
    }

    /// Entries belonging to one category
    pub fn entries_in(&self, category: LifestyleCategory) -> impl Iterator<Item = &LifestyleEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }
}

/// Weight goal driving recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric-deficit goal
    LoseWeight,
    /// Caloric-surplus goal
    GainWeight,
    /// Weight-stability goal
    MaintainWeight,
}

impl Goal {
    /// Lenient parse of stored goal strings ("lose weight", "lose-weight", ...).
    ///
    /// Unknown values map to `None`; an unset goal produces empty
    /// recommendations rather than an error.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let folded: String = value
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        match folded.as_str() {
            "lose weight" => Some(Self::LoseWeight),
            "gain weight" => Some(Self::GainWeight),
            "maintain weight" => Some(Self::MaintainWeight),
            _ => None,
        }
    }
}

/// Declared diet style, used by guidance messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    /// No restriction
    Regular,
    /// No meat
    Vegetarian,
    /// No animal products
    Vegan,
    /// Ketogenic
    Keto,
    /// Gluten-free
    GlutenFree,
    /// Paleolithic
    Paleo,
    /// Mediterranean
    Mediterranean,
    /// Intermittent fasting
    IntermittentFasting,
}

/// Dietary preferences for one user, read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Owning user
    pub user_id: Uuid,
    /// Declared diet style
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_type: Option<DietType>,
    /// Weight goal; `None` for unset or unrecognized goals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    /// Daily caloric target in kcal (800-5000)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caloric_target: Option<u32>,
    /// Products the user likes
    pub liked_products: Vec<String>,
    /// Products the user dislikes
    pub disliked_products: Vec<String>,
    /// Allergens and ingredients to avoid
    pub allergens: Vec<String>,
}

impl PreferenceProfile {
    /// Empty preference set for a user
    #[must_use]
    pub const fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            diet_type: None,
            goal: None,
            caloric_target: None,
            liked_products: Vec::new(),
            disliked_products: Vec::new(),
            allergens: Vec::new(),
        }
    }

    /// Reject out-of-domain preference values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CaloricTargetOutOfRange`] for targets
    /// outside 800-5000 kcal.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(target) = self.caloric_target {
            if !(CALORIC_TARGET_MIN..=CALORIC_TARGET_MAX).contains(&target) {
                return Err(ValidationError::CaloricTargetOutOfRange { value: target });
            }
        }
        Ok(())
    }
}
