// ABOUTME: Tests for the profile-backed lifestyle service facade
// ABOUTME: Store-loaded compatibility, recommendations, and guidance flows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan
#![allow(missing_docs)]

use nutriscan::models::{
    Goal, LifestyleCategory, LifestyleEntry, LifestyleProfile, PreferenceProfile,
};
use nutriscan::services::{LifestyleService, ServiceError};
use nutriscan::storage::InMemoryProfileStore;
use std::sync::Arc;
use uuid::Uuid;

fn entry(name: &str, category: LifestyleCategory, intensity: u8) -> LifestyleEntry {
    LifestyleEntry {
        lifestyle_type: name.to_owned(),
        category,
        priority: 1,
        intensity,
    }
}

async fn store_with_two_users() -> (Arc<InMemoryProfileStore>, Uuid, Uuid) {
    let store = Arc::new(InMemoryProfileStore::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store
        .put_lifestyle(LifestyleProfile::new(
            alice,
            vec![
                entry("moderately-active", LifestyleCategory::Activity, 7),
                entry("meal-prepper", LifestyleCategory::Social, 8),
            ],
        ))
        .await;
    store
        .put_lifestyle(LifestyleProfile::new(
            bob,
            vec![
                entry("moderately-active", LifestyleCategory::Activity, 9),
                entry("meal-prepper", LifestyleCategory::Social, 5),
            ],
        ))
        .await;
    (store, alice, bob)
}

#[tokio::test]
async fn compatibility_loads_fresh_profiles_from_the_store() {
    let (store, alice, bob) = store_with_two_users().await;
    let service = LifestyleService::new(store);

    let score = service
        .compatibility_between(alice, bob)
        .await
        .expect("both profiles stored");
    assert_eq!(score.comparable_count, 2);
    assert_eq!(score.compatible_count, 1);
    assert_eq!(score.percentage, Some(50.0));
}

#[tokio::test]
async fn self_comparison_is_rejected() {
    let (store, alice, _) = store_with_two_users().await;
    let service = LifestyleService::new(store);

    let err = service
        .compatibility_between(alice, alice)
        .await
        .expect_err("same user on both sides");
    assert!(matches!(err, ServiceError::SelfComparison));
}

#[tokio::test]
async fn missing_profile_is_reported_with_the_user_id() {
    let (store, alice, _) = store_with_two_users().await;
    let service = LifestyleService::new(store);
    let stranger = Uuid::new_v4();

    let err = service
        .compatibility_between(alice, stranger)
        .await
        .expect_err("stranger has no profile");
    assert!(matches!(err, ServiceError::ProfileNotFound(id) if id == stranger));
}

#[tokio::test]
async fn recommendations_exclude_lifestyles_the_user_already_holds() {
    let store = Arc::new(InMemoryProfileStore::new());
    let user = Uuid::new_v4();
    store
        .put_preferences(PreferenceProfile {
            goal: Some(Goal::LoseWeight),
            ..PreferenceProfile::empty(user)
        })
        .await;
    // Already moderately active: the table's top entry must drop out.
    store
        .put_lifestyle(LifestyleProfile::new(
            user,
            vec![entry("moderately-active", LifestyleCategory::Activity, 7)],
        ))
        .await;
    let service = LifestyleService::new(store);

    let names: Vec<&str> = service
        .recommended_lifestyles(user)
        .await
        .expect("profiles stored")
        .iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(
        names,
        vec!["weight-management", "meal-prepper", "regular-schedule"]
    );
}

#[tokio::test]
async fn user_without_preferences_gets_no_recommendations() {
    let service = LifestyleService::new(Arc::new(InMemoryProfileStore::new()));
    let recommended = service
        .recommended_lifestyles(Uuid::new_v4())
        .await
        .expect("empty store reads fine");
    assert!(recommended.is_empty());
}
