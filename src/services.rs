// ABOUTME: Service layer loading profile snapshots and driving the intelligence engines
// ABOUTME: Fresh store reads per call; the core never caches profile data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Lifestyle service.
//!
//! Bridges the profile store collaborator and the pure engines: each call
//! reads a fresh profile snapshot, validates at the boundary, and hands the
//! result to the caller. No state is retained between calls.

use crate::errors::ValidationError;
use crate::intelligence::lifestyle_constants::active_type_names;
use crate::intelligence::{
    evaluate_scan, score_compatibility, CompatibilityConfig, CompatibilityScore, LifestyleType,
    RecommendationEngine, ScanGuidance,
};
use crate::models::ScanResult;
use crate::storage::{ProfileStore, StorageError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a profile-backed service call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced user has no stored profile of the required kind
    #[error("no profile found for user {0}")]
    ProfileNotFound(Uuid),

    /// Comparing a user against themself is meaningless
    #[error("cannot compare a user with themself")]
    SelfComparison,

    /// The profile store could not be read
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A stored profile failed boundary validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Profile-backed facade over the compatibility and recommendation engines.
pub struct LifestyleService {
    store: Arc<dyn ProfileStore>,
    engine: RecommendationEngine,
    compatibility: CompatibilityConfig,
}

impl LifestyleService {
    /// Service with default engine configuration
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            engine: RecommendationEngine::new(),
            compatibility: CompatibilityConfig::default(),
        }
    }

    /// Pairwise compatibility between two users' stored lifestyles.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SelfComparison`] for identical ids,
    /// [`ServiceError::ProfileNotFound`] when either user has no lifestyle
    /// profile, and storage/validation failures otherwise.
    pub async fn compatibility_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<CompatibilityScore, ServiceError> {
        if user_a == user_b {
            return Err(ServiceError::SelfComparison);
        }
        let profile_a = self
            .store
            .lifestyle_profile(user_a)
            .await?
            .ok_or(ServiceError::ProfileNotFound(user_a))?;
        let profile_b = self
            .store
            .lifestyle_profile(user_b)
            .await?
            .ok_or(ServiceError::ProfileNotFound(user_b))?;
        Ok(score_compatibility(
            &profile_a,
            &profile_b,
            &self.compatibility,
        )?)
    }

    /// Goal-driven lifestyle recommendations for a user, excluding types
    /// the user already holds.
    ///
    /// A user without a preference profile gets an empty list, matching
    /// the unset-goal behavior.
    ///
    /// # Errors
    ///
    /// Returns storage failures from the profile store.
    pub async fn recommended_lifestyles(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<&'static LifestyleType>, ServiceError> {
        let Some(prefs) = self.store.preference_profile(user_id).await? else {
            return Ok(Vec::new());
        };
        let active: Vec<&str> = active_type_names().collect();
        let mut recommended = self.engine.recommend_lifestyles(&prefs, &active);

        if let Some(profile) = self.store.lifestyle_profile(user_id).await? {
            let held: Vec<&str> = profile
                .entries
                .iter()
                .map(|e| e.lifestyle_type.as_str())
                .collect();
            recommended.retain(|t| !held.contains(&t.name));
        }
        Ok(recommended)
    }

    /// Dietary guidance for a finished scan against the user's stored
    /// preferences. A user without preferences gets neutral guidance.
    ///
    /// # Errors
    ///
    /// Returns storage failures from the profile store.
    pub async fn guidance_for_scan(
        &self,
        user_id: Uuid,
        scan: &ScanResult,
    ) -> Result<ScanGuidance, ServiceError> {
        let prefs = self
            .store
            .preference_profile(user_id)
            .await?
            .unwrap_or_else(|| crate::models::PreferenceProfile::empty(user_id));
        Ok(evaluate_scan(scan, &prefs))
    }
}
