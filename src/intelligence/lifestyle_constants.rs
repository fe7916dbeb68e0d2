// ABOUTME: Lifestyle type catalog, goal-to-lifestyle tables, and scoring tolerances
// ABOUTME: Policy lives here as data so tuning never touches scoring logic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Lifestyle scoring constants.
//!
//! The recommendation tables and tolerances are declared as data, not
//! conditionals: changing policy means editing a table here, never the
//! merge or scoring code.

use crate::models::{Goal, LifestyleCategory};

/// Two users are compatible on a lifestyle type when their intensities
/// differ by at most this many points.
pub const INTENSITY_TOLERANCE: u8 = 2;

/// Fewer comparable lifestyle types than this yields `InsufficientData`
/// instead of a misleading percentage.
pub const MIN_COMPARABLE_TYPES: usize = 2;

/// A category whose average intensity sits below this suggests increasing
/// engagement there.
pub const LOW_INTENSITY_THRESHOLD: f64 = 4.0;

/// One entry in the lifestyle type catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifestyleType {
    /// Canonical type name, e.g. "moderately-active"
    pub name: &'static str,
    /// Category the type belongs to
    pub category: LifestyleCategory,
    /// Human-readable description
    pub description: &'static str,
    /// Whether the type is currently offered
    pub active: bool,
}

const fn lt(
    name: &'static str,
    category: LifestyleCategory,
    description: &'static str,
) -> LifestyleType {
    LifestyleType {
        name,
        category,
        description,
        active: true,
    }
}

/// The seeded lifestyle type catalog: 5 activity, 4 schedule, 4 social,
/// 5 health types.
pub const LIFESTYLE_TYPES: &[LifestyleType] = &[
    // activity levels
    lt("sedentary", LifestyleCategory::Activity, "Minimal physical activity, desk job"),
    lt("lightly-active", LifestyleCategory::Activity, "Light exercise 1-3 times per week"),
    lt("moderately-active", LifestyleCategory::Activity, "Moderate exercise 3-5 times per week"),
    lt("very-active", LifestyleCategory::Activity, "Heavy exercise 6-7 times per week"),
    lt(
        "extremely-active",
        LifestyleCategory::Activity,
        "Very heavy exercise, physical job, training twice per day",
    ),
    // schedule preferences
    lt("early-bird", LifestyleCategory::Schedule, "Prefers early morning activities and meals"),
    lt("night-owl", LifestyleCategory::Schedule, "Prefers evening activities and late meals"),
    lt(
        "regular-schedule",
        LifestyleCategory::Schedule,
        "Consistent daily routine and meal times",
    ),
    lt(
        "irregular-schedule",
        LifestyleCategory::Schedule,
        "Variable schedule, flexible meal timing",
    ),
    // social eating habits
    lt(
        "family-oriented",
        LifestyleCategory::Social,
        "Enjoys family meals and cooking together",
    ),
    lt(
        "social-eater",
        LifestyleCategory::Social,
        "Prefers dining out and social food experiences",
    ),
    lt("solo-eater", LifestyleCategory::Social, "Comfortable eating alone, values quiet meals"),
    lt(
        "meal-prepper",
        LifestyleCategory::Social,
        "Enjoys planning and preparing meals in advance",
    ),
    // health focus areas
    lt(
        "weight-management",
        LifestyleCategory::Health,
        "Focused on maintaining healthy weight",
    ),
    lt("muscle-building", LifestyleCategory::Health, "Focused on building muscle mass"),
    lt(
        "endurance-training",
        LifestyleCategory::Health,
        "Focused on cardiovascular endurance",
    ),
    lt("recovery-focused", LifestyleCategory::Health, "Focused on recovery and healing"),
    lt(
        "stress-management",
        LifestyleCategory::Health,
        "Focused on managing stress through diet",
    ),
];

/// Goal-to-lifestyle recommendation tables, highest priority first.
const LOSE_WEIGHT_LIFESTYLES: &[&str] = &[
    "moderately-active",
    "weight-management",
    "meal-prepper",
    "regular-schedule",
];
const GAIN_WEIGHT_LIFESTYLES: &[&str] = &[
    "very-active",
    "muscle-building",
    "family-oriented",
    "early-bird",
];
const MAINTAIN_WEIGHT_LIFESTYLES: &[&str] =
    &["lightly-active", "regular-schedule", "weight-management"];

/// Ordered candidate lifestyles for a goal.
#[must_use]
pub const fn recommendations_for_goal(goal: Goal) -> &'static [&'static str] {
    match goal {
        Goal::LoseWeight => LOSE_WEIGHT_LIFESTYLES,
        Goal::GainWeight => GAIN_WEIGHT_LIFESTYLES,
        Goal::MaintainWeight => MAINTAIN_WEIGHT_LIFESTYLES,
    }
}

/// Catalog lookup by type name.
#[must_use]
pub fn lifestyle_type(name: &str) -> Option<&'static LifestyleType> {
    LIFESTYLE_TYPES.iter().find(|t| t.name == name)
}

/// Names of all currently-active catalog types.
pub fn active_type_names() -> impl Iterator<Item = &'static str> {
    LIFESTYLE_TYPES.iter().filter(|t| t.active).map(|t| t.name)
}
