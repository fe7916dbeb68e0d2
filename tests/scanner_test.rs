// ABOUTME: Integration tests for the recognition orchestrator
// ABOUTME: Mock backends exercise fan-out, degradation, timeouts, and history handoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan
#![allow(missing_docs)]

use async_trait::async_trait;
use nutriscan::config::ScanConfig;
use nutriscan::errors::RecognitionError;
use nutriscan::external::{CatalogProduct, MockCatalogClient};
use nutriscan::models::{BackendKind, Detection, NutritionRecord, ScanInput};
use nutriscan::providers::{BackendError, BackendRegistry, RecognitionBackend};
use nutriscan::scanner::{ScanOptions, ScanService, Scanner};
use nutriscan::storage::InMemoryScanHistory;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Scripted backend: serves a fixed response, optionally after a delay.
struct MockBackend {
    kind: BackendKind,
    image_capable: bool,
    barcode_capable: bool,
    delay: Option<Duration>,
    response: Result<Vec<Detection>, ()>,
    calls: AtomicUsize,
}

impl MockBackend {
    fn ok(kind: BackendKind, detections: Vec<Detection>) -> Self {
        Self {
            kind,
            image_capable: true,
            barcode_capable: false,
            delay: None,
            response: Ok(detections),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(kind: BackendKind) -> Self {
        Self {
            response: Err(()),
            ..Self::ok(kind, Vec::new())
        }
    }

    fn slow(kind: BackendKind, delay: Duration, detections: Vec<Detection>) -> Self {
        Self {
            delay: Some(delay),
            ..Self::ok(kind, detections)
        }
    }

    fn barcode_only(mut self) -> Self {
        self.image_capable = false;
        self.barcode_capable = true;
        self
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecognitionBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn accepts(&self, input: &ScanInput) -> bool {
        if input.is_barcode() {
            self.barcode_capable
        } else {
            self.image_capable
        }
    }

    async fn detect(
        &self,
        _input: &ScanInput,
        _deadline: Duration,
    ) -> Result<Vec<Detection>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            Ok(detections) => Ok(detections.clone()),
            Err(()) => Err(BackendError::Network("scripted failure".to_owned())),
        }
    }
}

fn det(label: &str, confidence: f64, source: BackendKind) -> Detection {
    Detection::new(label, confidence, source).expect("valid confidence")
}

fn image_input() -> ScanInput {
    ScanInput::image(vec![0xFF, 0xD8, 0xFF], "image/jpeg").expect("valid image")
}

fn scanner_with(backends: Vec<Arc<dyn RecognitionBackend>>, catalog: Arc<MockCatalogClient>) -> Scanner {
    let mut registry = BackendRegistry::empty();
    for backend in backends {
        registry.register(backend);
    }
    let config = ScanConfig {
        timeout: Duration::from_millis(500),
        ..ScanConfig::default()
    };
    Scanner::new(registry, catalog, config)
}

#[tokio::test]
async fn merges_across_backends_and_resolves_nutrition() {
    let catalog = Arc::new(MockCatalogClient::new());
    catalog
        .insert_label(
            "banana",
            CatalogProduct {
                name: "Banana".to_owned(),
                brand: None,
                categories: vec!["fruit".to_owned()],
                allergens: Vec::new(),
                nutrition: NutritionRecord::new(89.0, 1.1, 23.0, 0.3).ok(),
            },
        )
        .await;

    let scanner = scanner_with(
        vec![
            Arc::new(MockBackend::ok(
                BackendKind::Vision,
                vec![det("banana", 0.9, BackendKind::Vision).with_weight(118.0)],
            )),
            Arc::new(MockBackend::ok(
                BackendKind::Synthetic,
                vec![det("banana", 0.8, BackendKind::Synthetic)],
            )),
        ],
        catalog,
    );

    let result = scanner
        .recognize(&image_input(), None)
        .await
        .expect("scan succeeds");
    assert_eq!(result.detections.len(), 1);
    let banana = &result.detections[0];
    assert!((banana.confidence - 0.98).abs() < 1e-9);
    assert!(banana.nutrition_resolved, "catalog lookup should attach nutrition");
    assert_eq!(banana.category.as_deref(), Some("fruit"));
    assert!(result.degraded_backends.is_empty());
}

#[tokio::test]
async fn one_failing_backend_degrades_without_failing_the_scan() {
    let scanner = scanner_with(
        vec![
            Arc::new(MockBackend::ok(
                BackendKind::Vision,
                vec![det("bread", 0.7, BackendKind::Vision)],
            )),
            Arc::new(MockBackend::failing(BackendKind::Synthetic)),
        ],
        Arc::new(MockCatalogClient::new()),
    );

    let result = scanner
        .recognize(&image_input(), None)
        .await
        .expect("healthy backend carries the scan");
    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.degraded_backends, vec![BackendKind::Synthetic]);
    // Unresolvable nutrition is flagged, never dropped.
    assert!(!result.detections[0].nutrition_resolved);
}

#[tokio::test]
async fn all_backends_failing_surfaces_all_backends_failed() {
    let scanner = scanner_with(
        vec![
            Arc::new(MockBackend::failing(BackendKind::Vision)),
            Arc::new(MockBackend::failing(BackendKind::Synthetic)),
        ],
        Arc::new(MockCatalogClient::new()),
    );

    let err = scanner
        .recognize(&image_input(), None)
        .await
        .expect_err("every backend failed");
    assert!(matches!(
        err,
        RecognitionError::AllBackendsFailed { attempted: 2 }
    ));
}

#[tokio::test]
async fn timed_out_backends_count_as_failed() {
    let scanner = scanner_with(
        vec![
            Arc::new(MockBackend::slow(
                BackendKind::Vision,
                Duration::from_secs(30),
                vec![det("banana", 0.9, BackendKind::Vision)],
            )),
            Arc::new(MockBackend::slow(
                BackendKind::Synthetic,
                Duration::from_secs(30),
                vec![det("banana", 0.8, BackendKind::Synthetic)],
            )),
        ],
        Arc::new(MockCatalogClient::new()),
    );

    let options = ScanOptions {
        timeout: Some(Duration::from_millis(50)),
        ..ScanOptions::default()
    };
    let err = scanner
        .recognize(&image_input(), Some(&options))
        .await
        .expect_err("both backends exceeded the budget");
    assert!(matches!(err, RecognitionError::AllBackendsFailed { .. }));
}

#[tokio::test]
async fn no_history_write_happens_for_failed_scans() {
    let history = Arc::new(InMemoryScanHistory::new());
    let scanner = scanner_with(
        vec![Arc::new(MockBackend::failing(BackendKind::Vision))],
        Arc::new(MockCatalogClient::new()),
    );
    let service = ScanService::new(scanner, history.clone());
    let user = Uuid::new_v4();

    let outcome = service.scan_for_user(user, &image_input(), None).await;
    assert!(outcome.is_err());
    assert!(history.recent(user).await.is_empty());
}

#[tokio::test]
async fn successful_scans_are_recorded_in_history() {
    let history = Arc::new(InMemoryScanHistory::new());
    let scanner = scanner_with(
        vec![Arc::new(MockBackend::ok(
            BackendKind::Vision,
            vec![det("banana", 0.9, BackendKind::Vision)],
        ))],
        Arc::new(MockCatalogClient::new()),
    );
    let service = ScanService::new(scanner, history.clone());
    let user = Uuid::new_v4();

    service
        .scan_for_user(user, &image_input(), None)
        .await
        .expect("scan succeeds");
    assert_eq!(history.recent(user).await, vec!["banana"]);
}

#[tokio::test]
async fn empty_but_healthy_responses_yield_nothing_recognized() {
    let scanner = scanner_with(
        vec![Arc::new(MockBackend::ok(BackendKind::Vision, Vec::new()))],
        Arc::new(MockCatalogClient::new()),
    );

    let err = scanner
        .recognize(&image_input(), None)
        .await
        .expect_err("no detections at all");
    assert!(matches!(err, RecognitionError::NothingRecognized));
}

#[tokio::test]
async fn low_confidence_detections_are_filtered_before_merge() {
    let scanner = scanner_with(
        vec![Arc::new(MockBackend::ok(
            BackendKind::Vision,
            vec![
                det("banana", 0.9, BackendKind::Vision),
                det("maybe-a-shadow", 0.1, BackendKind::Vision),
            ],
        ))],
        Arc::new(MockCatalogClient::new()),
    );

    let result = scanner
        .recognize(&image_input(), None)
        .await
        .expect("scan succeeds");
    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.detections[0].label, "banana");
}

#[tokio::test]
async fn barcode_inputs_go_only_to_barcode_capable_backends() {
    let barcode_backend = Arc::new(
        MockBackend::ok(
            BackendKind::Barcode,
            vec![det("Banana", 1.0, BackendKind::Barcode)],
        )
        .barcode_only(),
    );
    let vision_backend = Arc::new(MockBackend::ok(
        BackendKind::Vision,
        vec![det("banana", 0.9, BackendKind::Vision)],
    ));
    let scanner = scanner_with(
        vec![barcode_backend.clone(), vision_backend.clone()],
        Arc::new(MockCatalogClient::new()),
    );

    let input = ScanInput::barcode("4000417025005").expect("valid barcode");
    let result = scanner.recognize(&input, None).await.expect("scan succeeds");
    assert_eq!(result.detections[0].source, BackendKind::Barcode);
    assert_eq!(barcode_backend.call_count(), 1);
    assert_eq!(vision_backend.call_count(), 0);
}

#[tokio::test]
async fn unroutable_input_is_rejected_without_backend_calls() {
    let scanner = scanner_with(
        vec![Arc::new(MockBackend::ok(BackendKind::Vision, Vec::new()))],
        Arc::new(MockCatalogClient::new()),
    );
    let input = ScanInput::barcode("12345678").expect("valid barcode");
    let err = scanner
        .recognize(&input, None)
        .await
        .expect_err("no barcode-capable backend registered");
    assert!(matches!(err, RecognitionError::NoBackendAvailable(_)));
}

#[tokio::test]
async fn slow_backend_degrades_while_fast_one_answers() {
    let scanner = scanner_with(
        vec![
            Arc::new(MockBackend::ok(
                BackendKind::Vision,
                vec![det("banana", 0.9, BackendKind::Vision)],
            )),
            Arc::new(MockBackend::slow(
                BackendKind::Synthetic,
                Duration::from_secs(30),
                vec![det("banana", 0.9, BackendKind::Synthetic)],
            )),
        ],
        Arc::new(MockCatalogClient::new()),
    );

    let options = ScanOptions {
        timeout: Some(Duration::from_millis(100)),
        ..ScanOptions::default()
    };
    let result = scanner
        .recognize(&image_input(), Some(&options))
        .await
        .expect("fast backend carries the scan");
    assert_eq!(result.degraded_backends, vec![BackendKind::Synthetic]);
    assert_eq!(result.detections.len(), 1);
}
