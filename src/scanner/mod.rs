// ABOUTME: Recognition orchestrator fanning out to backends and merging results
// ABOUTME: Shared timeout budget, degraded-backend tracking, nutrition resolution, history handoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Recognition orchestration.
//!
//! One [`Scanner::recognize`] call classifies the input, dispatches every
//! capable backend concurrently under a shared wall-clock budget, merges
//! the surviving detections, and resolves nutrition for labels that still
//! lack it. Backend calls write only their own result slot; merging runs
//! single-threaded after the join, so no locking discipline is needed.
//!
//! Dropping the returned future cancels all in-flight backend calls: the
//! fan-out is plain future composition, not detached tasks.

/// Detection dedup/merge algorithm
pub mod merge;

pub use merge::{merge_detections, overall_confidence, MergeConfig};

use crate::config::ScanConfig;
use crate::errors::RecognitionError;
use crate::external::ProductNutritionLookup;
use crate::models::{BackendKind, Detection, ScanInput, ScanResult};
use crate::providers::{BackendError, BackendRegistry, CircuitBreaker};
use crate::storage::ScanHistoryWriter;
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-call overrides of the configured scan policy.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Override the shared timeout budget
    pub timeout: Option<Duration>,
    /// Override the confidence floor
    pub min_confidence: Option<f64>,
}

/// The recognition orchestrator.
pub struct Scanner {
    registry: BackendRegistry,
    catalog: Arc<dyn ProductNutritionLookup>,
    breakers: HashMap<BackendKind, CircuitBreaker>,
    config: ScanConfig,
}

impl Scanner {
    /// Build a scanner over a backend registry and catalog client.
    #[must_use]
    pub fn new(
        registry: BackendRegistry,
        catalog: Arc<dyn ProductNutritionLookup>,
        config: ScanConfig,
    ) -> Self {
        let breakers = registry
            .all()
            .iter()
            .map(|b| (b.kind(), CircuitBreaker::new(b.kind())))
            .collect();
        Self {
            registry,
            catalog,
            breakers,
            config,
        }
    }

    /// Recognize the products in one input.
    ///
    /// # Errors
    ///
    /// - [`RecognitionError::NoBackendAvailable`] when nothing can process
    ///   this input kind
    /// - [`RecognitionError::AllBackendsFailed`] when every invoked backend
    ///   errored or timed out; no partial result is returned
    /// - [`RecognitionError::NothingRecognized`] when backends responded
    ///   but no detection met the confidence floor
    pub async fn recognize(
        &self,
        input: &ScanInput,
        options: Option<&ScanOptions>,
    ) -> Result<ScanResult, RecognitionError> {
        let backends = self.registry.backends_for(input);
        if backends.is_empty() {
            return Err(RecognitionError::NoBackendAvailable(input.reference()));
        }

        let budget = options
            .and_then(|o| o.timeout)
            .unwrap_or(self.config.timeout);
        let min_confidence = options
            .and_then(|o| o.min_confidence)
            .unwrap_or(self.config.min_confidence);

        // Fan-out: one future per backend, each racing the same shared
        // deadline and writing only its own (kind, result) slot.
        let calls = backends.iter().map(|backend| {
            let kind = backend.kind();
            let breaker = self.breakers.get(&kind);
            async move {
                if let Some(breaker) = breaker {
                    if let Err(err) = breaker.check() {
                        return (kind, Err(err));
                    }
                }
                let outcome = match tokio::time::timeout(budget, backend.detect(input, budget)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(BackendError::Timeout { backend: kind }),
                };
                if let Some(breaker) = breaker {
                    match &outcome {
                        Ok(_) => breaker.record_success(),
                        Err(err) => breaker.record_failure(err),
                    }
                }
                (kind, outcome)
            }
        });
        let slots = join_all(calls).await;

        let mut raw: Vec<Detection> = Vec::new();
        let mut degraded: Vec<BackendKind> = Vec::new();
        let mut succeeded = 0_usize;
        for (kind, outcome) in slots {
            match outcome {
                Ok(detections) => {
                    succeeded += 1;
                    debug!(backend = %kind, count = detections.len(), "backend responded");
                    raw.extend(
                        detections
                            .into_iter()
                            .filter(|d| d.confidence >= min_confidence),
                    );
                }
                Err(err) => {
                    warn!(backend = %kind, %err, "backend degraded");
                    degraded.push(kind);
                }
            }
        }

        if succeeded == 0 {
            return Err(RecognitionError::AllBackendsFailed {
                attempted: backends.len(),
            });
        }

        let mut detections = merge_detections(raw, &self.config.merge);
        if detections.is_empty() {
            return Err(RecognitionError::NothingRecognized);
        }

        self.resolve_nutrition(&mut detections).await;

        detections.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let confidence = overall_confidence(&detections);

        let result = ScanResult {
            id: Uuid::new_v4(),
            overall_confidence: confidence,
            degraded_backends: degraded,
            scan_timestamp: Utc::now(),
            raw_input_ref: input.reference(),
            detections,
        };
        info!(
            scan = %result.id,
            items = result.detections.len(),
            confidence,
            degraded = result.degraded_backends.len(),
            "scan complete"
        );
        Ok(result)
    }

    /// Attach catalog nutrition to detections that still lack it.
    ///
    /// Lookup failures are soft: the detection stays with
    /// `nutrition_resolved == false` and never blocks the rest of the
    /// result.
    async fn resolve_nutrition(&self, detections: &mut [Detection]) {
        for detection in detections.iter_mut().filter(|d| d.nutrition.is_none()) {
            match self.catalog.resolve_label(&detection.label).await {
                Ok(Some(product)) => {
                    if detection.category.is_none() {
                        detection.category = product.categories.first().cloned();
                    }
                    if let Some(nutrition) = product.nutrition {
                        detection.nutrition = Some(nutrition);
                        detection.nutrition_resolved = true;
                    }
                }
                Ok(None) => {
                    debug!(label = %detection.label, "no catalog entry for label");
                }
                Err(err) => {
                    debug!(label = %detection.label, %err, "nutrition lookup failed");
                }
            }
        }
    }
}

/// Scanner plus scan-history handoff.
///
/// History writes are best-effort: a failing writer is logged and the scan
/// result is still returned. No history write happens for failed scans.
pub struct ScanService {
    scanner: Scanner,
    history: Arc<dyn ScanHistoryWriter>,
}

impl ScanService {
    /// Bundle a scanner with a history writer
    #[must_use]
    pub const fn new(scanner: Scanner, history: Arc<dyn ScanHistoryWriter>) -> Self {
        Self { scanner, history }
    }

    /// Recognize and record the result in the user's scan history.
    ///
    /// # Errors
    ///
    /// Propagates [`RecognitionError`] from the underlying scan; history
    /// write failures are logged, not surfaced.
    pub async fn scan_for_user(
        &self,
        user_id: Uuid,
        input: &ScanInput,
        options: Option<&ScanOptions>,
    ) -> Result<ScanResult, RecognitionError> {
        let result = self.scanner.recognize(input, options).await?;
        if let Err(err) = self.history.record(user_id, &result).await {
            warn!(%user_id, scan = %result.id, %err, "scan history write failed");
        }
        Ok(result)
    }

    /// Access the underlying scanner
    #[must_use]
    pub const fn scanner(&self) -> &Scanner {
        &self.scanner
    }
}
