// ABOUTME: Scan orchestration configuration loaded from environment variables
// ABOUTME: Hardcoded defaults keep development working with zero setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Configuration.
//!
//! Environment-only: every knob has a `NUTRISCAN_*` variable and a default
//! that works out of the box. No config files.

/// Environment variable helpers
pub mod environment;

use crate::external::OpenFoodFactsConfig;
use crate::providers::core::BackendConfig;
use crate::scanner::MergeConfig;
use environment::{env_opt, env_parse, env_string};
use std::time::Duration;

/// Shared wall-clock budget for one recognition call, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Raw detections below this confidence are discarded before merging.
const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Shared timeout budget for all concurrent backend calls in one scan.
    /// Each call races the same deadline; the budget is not multiplied per
    /// backend.
    pub timeout: Duration,
    /// Confidence floor applied to raw detections before merging
    pub min_confidence: f64,
    /// Detection merge thresholds
    pub merge: MergeConfig,
    /// Vision backend endpoint; `None` disables the backend
    pub vision: Option<BackendConfig>,
    /// Product catalog client settings
    pub catalog: OpenFoodFactsConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            merge: MergeConfig::default(),
            vision: None,
            catalog: OpenFoodFactsConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from `NUTRISCAN_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let vision = env_opt("NUTRISCAN_VISION_URL").map(|base_url| BackendConfig {
            base_url,
            api_key: env_opt("NUTRISCAN_VISION_API_KEY"),
            model: env_opt("NUTRISCAN_VISION_MODEL"),
        });

        let catalog = OpenFoodFactsConfig {
            base_url: env_string("NUTRISCAN_CATALOG_URL", &defaults.catalog.base_url),
            user_agent: env_string("NUTRISCAN_CATALOG_USER_AGENT", &defaults.catalog.user_agent),
            cache_ttl_secs: env_parse(
                "NUTRISCAN_CATALOG_CACHE_TTL_SECS",
                defaults.catalog.cache_ttl_secs,
            ),
            rate_limit_per_minute: env_parse(
                "NUTRISCAN_CATALOG_RATE_LIMIT",
                defaults.catalog.rate_limit_per_minute,
            ),
            timeout_secs: env_parse(
                "NUTRISCAN_CATALOG_TIMEOUT_SECS",
                defaults.catalog.timeout_secs,
            ),
        };

        Self {
            timeout: Duration::from_secs(env_parse(
                "NUTRISCAN_SCAN_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            min_confidence: env_parse("NUTRISCAN_MIN_CONFIDENCE", DEFAULT_MIN_CONFIDENCE),
            merge: MergeConfig {
                label_similarity_threshold: env_parse(
                    "NUTRISCAN_MERGE_LABEL_SIMILARITY",
                    defaults.merge.label_similarity_threshold,
                ),
                iou_threshold: env_parse(
                    "NUTRISCAN_MERGE_IOU_THRESHOLD",
                    defaults.merge.iou_threshold,
                ),
            },
            vision,
            catalog,
        }
    }
}
