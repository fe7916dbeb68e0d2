// ABOUTME: Environment-driven configuration loading tests
// ABOUTME: Defaults, overrides, and graceful fallback on malformed values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan
#![allow(missing_docs)]

use nutriscan::config::ScanConfig;
use serial_test::serial;
use std::env;
use std::time::Duration;

fn clear_scan_env() {
    for key in [
        "NUTRISCAN_SCAN_TIMEOUT_SECS",
        "NUTRISCAN_MIN_CONFIDENCE",
        "NUTRISCAN_MERGE_LABEL_SIMILARITY",
        "NUTRISCAN_MERGE_IOU_THRESHOLD",
        "NUTRISCAN_VISION_URL",
        "NUTRISCAN_VISION_API_KEY",
        "NUTRISCAN_VISION_MODEL",
        "NUTRISCAN_CATALOG_URL",
        "NUTRISCAN_CATALOG_USER_AGENT",
        "NUTRISCAN_CATALOG_CACHE_TTL_SECS",
        "NUTRISCAN_CATALOG_RATE_LIMIT",
        "NUTRISCAN_CATALOG_TIMEOUT_SECS",
    ] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn defaults_apply_with_empty_environment() {
    clear_scan_env();
    let config = ScanConfig::from_env();
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert!((config.min_confidence - 0.3).abs() < 1e-9);
    assert!(config.vision.is_none());
    assert!(config.catalog.base_url.contains("openfoodfacts.org"));
}

#[test]
#[serial]
fn environment_overrides_are_honored() {
    clear_scan_env();
    env::set_var("NUTRISCAN_SCAN_TIMEOUT_SECS", "5");
    env::set_var("NUTRISCAN_MIN_CONFIDENCE", "0.5");
    env::set_var("NUTRISCAN_VISION_URL", "https://vision.example.com");
    env::set_var("NUTRISCAN_VISION_MODEL", "food-vision-2");

    let config = ScanConfig::from_env();
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert!((config.min_confidence - 0.5).abs() < 1e-9);
    let vision = config.vision.expect("vision configured");
    assert_eq!(vision.base_url, "https://vision.example.com");
    assert_eq!(vision.model.as_deref(), Some("food-vision-2"));
    assert_eq!(vision.api_key, None);

    clear_scan_env();
}

#[test]
#[serial]
fn malformed_numbers_fall_back_to_defaults() {
    clear_scan_env();
    env::set_var("NUTRISCAN_SCAN_TIMEOUT_SECS", "eleven");
    env::set_var("NUTRISCAN_MIN_CONFIDENCE", "very sure");

    let config = ScanConfig::from_env();
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert!((config.min_confidence - 0.3).abs() < 1e-9);

    clear_scan_env();
}
