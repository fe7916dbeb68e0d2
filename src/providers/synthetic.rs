// ABOUTME: Deterministic synthetic recognition backend for development and testing
// ABOUTME: Serves pre-loaded detections without network access or credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Synthetic backend.
//!
//! Serves pre-loaded detections for any image input, letting the
//! orchestrator, merge logic, and guidance run in CI and demos without a
//! vision endpoint or catalog connectivity. Deterministic by default; an
//! optional confidence jitter simulates varying model certainty for demos.

use crate::models::{BackendKind, Detection, ScanInput};
use crate::providers::core::RecognitionBackend;
use crate::providers::errors::BackendError;
use async_trait::async_trait;
use rand::Rng as _;
use std::time::Duration;

/// Recognition backend serving canned detections.
pub struct SyntheticBackend {
    detections: Vec<Detection>,
    confidence_jitter: f64,
}

impl SyntheticBackend {
    /// Backend that answers every image scan with the given detections
    #[must_use]
    pub const fn with_detections(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            confidence_jitter: 0.0,
        }
    }

    /// Add +/- `jitter` of uniform confidence noise per call, for demos
    /// where identical answers look canned. Results stay clamped to [0, 1].
    #[must_use]
    pub const fn with_confidence_jitter(mut self, jitter: f64) -> Self {
        self.confidence_jitter = jitter;
        self
    }
}

#[async_trait]
impl RecognitionBackend for SyntheticBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Synthetic
    }

    fn accepts(&self, input: &ScanInput) -> bool {
        matches!(input, ScanInput::Image { .. })
    }

    async fn detect(
        &self,
        _input: &ScanInput,
        _deadline: Duration,
    ) -> Result<Vec<Detection>, BackendError> {
        if self.confidence_jitter <= 0.0 {
            return Ok(self.detections.clone());
        }
        let mut rng = rand::thread_rng();
        Ok(self
            .detections
            .iter()
            .cloned()
            .map(|mut d| {
                let noise = rng.gen_range(-self.confidence_jitter..=self.confidence_jitter);
                d.confidence = (d.confidence + noise).clamp(0.0, 1.0);
                d
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_preloaded_detections() {
        let detection = Detection::new("apple", 0.8, BackendKind::Synthetic).expect("valid");
        let backend = SyntheticBackend::with_detections(vec![detection]);
        let input = ScanInput::image(vec![0xFF], "image/jpeg").expect("valid image");

        let detections = backend
            .detect(&input, Duration::from_secs(1))
            .await
            .expect("synthetic never fails");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "apple");
    }

    #[tokio::test]
    async fn jitter_keeps_confidence_in_range() {
        let detection = Detection::new("apple", 0.95, BackendKind::Synthetic).expect("valid");
        let backend =
            SyntheticBackend::with_detections(vec![detection]).with_confidence_jitter(0.2);
        let input = ScanInput::image(vec![0xFF], "image/jpeg").expect("valid image");

        for _ in 0..20 {
            let detections = backend
                .detect(&input, Duration::from_secs(1))
                .await
                .expect("synthetic never fails");
            assert!((0.0..=1.0).contains(&detections[0].confidence));
        }
    }
}
