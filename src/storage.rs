// ABOUTME: Collaborator traits for profile reads and scan history writes
// ABOUTME: The core consumes these contracts; storage mechanics live outside
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! External storage collaborators.
//!
//! The core holds no long-lived mutable state; profiles are read as fresh
//! snapshots per call and finalized scans are handed off to the history
//! writer. In-memory implementations back tests and demos.

use crate::models::{LifestyleProfile, PreferenceProfile, ScanResult};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A user keeps at most this many scan history entries; older ones roll off.
pub const SCAN_HISTORY_CAP: usize = 20;

/// Failure of a storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be reached or refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Read access to persisted user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a user's lifestyle profile, `None` when the user has none.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store cannot be read.
    async fn lifestyle_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LifestyleProfile>, StorageError>;

    /// Load a user's preference profile, `None` when the user has none.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store cannot be read.
    async fn preference_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PreferenceProfile>, StorageError>;
}

/// Write access to per-user scan history.
#[async_trait]
pub trait ScanHistoryWriter: Send + Sync {
    /// Record a finalized scan for a user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write fails; the scan service
    /// treats that as best-effort and still returns the result.
    async fn record(&self, user_id: Uuid, result: &ScanResult) -> Result<(), StorageError>;
}

/// In-memory profile store for tests and demos.
#[derive(Default)]
pub struct InMemoryProfileStore {
    lifestyles: RwLock<HashMap<Uuid, LifestyleProfile>>,
    preferences: RwLock<HashMap<Uuid, PreferenceProfile>>,
}

impl InMemoryProfileStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a lifestyle profile
    pub async fn put_lifestyle(&self, profile: LifestyleProfile) {
        self.lifestyles
            .write()
            .await
            .insert(profile.user_id, profile);
    }

    /// Insert or replace a preference profile
    pub async fn put_preferences(&self, profile: PreferenceProfile) {
        self.preferences
            .write()
            .await
            .insert(profile.user_id, profile);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn lifestyle_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LifestyleProfile>, StorageError> {
        Ok(self.lifestyles.read().await.get(&user_id).cloned())
    }

    async fn preference_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PreferenceProfile>, StorageError> {
        Ok(self.preferences.read().await.get(&user_id).cloned())
    }
}

/// In-memory scan history: most recent first, deduplicated by label with
/// move-to-front, capped at [`SCAN_HISTORY_CAP`] entries per user.
#[derive(Default)]
pub struct InMemoryScanHistory {
    entries: RwLock<HashMap<Uuid, Vec<String>>>,
}

impl InMemoryScanHistory {
    /// Empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent product labels for a user, most recent first
    pub async fn recent(&self, user_id: Uuid) -> Vec<String> {
        self.entries
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ScanHistoryWriter for InMemoryScanHistory {
    async fn record(&self, user_id: Uuid, result: &ScanResult) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let history = entries.entry(user_id).or_default();
        for detection in &result.detections {
            history.retain(|existing| existing != &detection.label);
            history.insert(0, detection.label.clone());
        }
        history.truncate(SCAN_HISTORY_CAP);
        Ok(())
    }
}
