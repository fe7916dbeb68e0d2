// ABOUTME: Detection, bounding region, scan input, and scan result value objects
// ABOUTME: One Detection per identified food item; ScanResult is immutable after return
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

use crate::errors::{RecognitionError, ValidationError};
use crate::models::nutrition::NutritionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Barcode payloads are plain digit strings between 8 (EAN-8) and 13 (EAN-13)
/// characters; anything else is treated as image data.
const BARCODE_MIN_DIGITS: usize = 8;
const BARCODE_MAX_DIGITS: usize = 13;

/// Which backend produced a detection.
///
/// Variant order is the merge tie-break order: when two candidates for the
/// same physical item carry equal confidence, the earlier variant wins the
/// label because a catalog match beats visual inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Barcode decoder + product-catalog lookup (exact match)
    Barcode,
    /// Vision-model identifier (visual inference)
    Vision,
    /// Deterministic synthetic backend for development and tests
    Synthetic,
}

impl BackendKind {
    /// Backend name for logging and config lookup
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Barcode => "barcode",
            Self::Vision => "vision",
            Self::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw input to a recognition call: one image or one decoded barcode payload.
#[derive(Debug, Clone)]
pub enum ScanInput {
    /// Encoded image bytes plus the reported content type
    Image {
        /// Raw encoded image data (JPEG/PNG)
        bytes: Vec<u8>,
        /// MIME type as reported by the caller, e.g. `image/jpeg`
        content_type: String,
    },
    /// A decoded barcode payload, validated to 8-13 digits
    Barcode(String),
}

impl ScanInput {
    /// Build an image input.
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::InvalidInput`] for empty image data.
    pub fn image(bytes: Vec<u8>, content_type: impl Into<String>) -> Result<Self, RecognitionError> {
        if bytes.is_empty() {
            return Err(RecognitionError::InvalidInput("empty image payload".into()));
        }
        Ok(Self::Image {
            bytes,
            content_type: content_type.into(),
        })
    }

    /// Build a barcode input from a decoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::InvalidInput`] unless the payload is
    /// 8-13 ASCII digits.
    pub fn barcode(code: impl Into<String>) -> Result<Self, RecognitionError> {
        let code = code.into();
        if !is_barcode_payload(&code) {
            return Err(RecognitionError::InvalidInput(format!(
                "barcode must be {BARCODE_MIN_DIGITS}-{BARCODE_MAX_DIGITS} digits, got '{code}'"
            )));
        }
        Ok(Self::Barcode(code))
    }

    /// Classify a free-form payload: digit strings in barcode range become
    /// [`ScanInput::Barcode`], everything else is image data.
    #[must_use]
    pub fn classify(payload: Vec<u8>, content_type: &str) -> Self {
        if let Ok(text) = std::str::from_utf8(&payload) {
            if is_barcode_payload(text.trim()) {
                return Self::Barcode(text.trim().to_owned());
            }
        }
        Self::Image {
            bytes: payload,
            content_type: content_type.to_owned(),
        }
    }

    /// Whether this input carries a barcode payload
    #[must_use]
    pub const fn is_barcode(&self) -> bool {
        matches!(self, Self::Barcode(_))
    }

    /// Short reference string recorded on the resulting scan,
    /// e.g. `barcode:4000417025005` or `image/jpeg:52143B`.
    #[must_use]
    pub fn reference(&self) -> String {
        match self {
            Self::Barcode(code) => format!("barcode:{code}"),
            Self::Image {
                bytes,
                content_type,
            } => format!("{content_type}:{}B", bytes.len()),
        }
    }
}

fn is_barcode_payload(s: &str) -> bool {
    (BARCODE_MIN_DIGITS..=BARCODE_MAX_DIGITS).contains(&s.len())
        && s.bytes().all(|b| b.is_ascii_digit())
}

/// Spatial hint for one detection, normalized to [0, 1] image coordinates.
///
/// Absent for barcode-sourced detections, which have no spatial extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    /// Left edge, fraction of image width
    pub x: f64,
    /// Top edge, fraction of image height
    pub y: f64,
    /// Region width, fraction of image width
    pub width: f64,
    /// Region height, fraction of image height
    pub height: f64,
}

impl BoundingRegion {
    /// Intersection-over-union with another region.
    ///
    /// Degenerate (zero-area) regions yield 0.0.
    #[must_use]
    pub fn iou(&self, other: &Self) -> f64 {
        let ix = (self.x + self.width).min(other.x + other.width) - self.x.max(other.x);
        let iy = (self.y + self.height).min(other.y + other.height) - self.y.max(other.y);
        if ix <= 0.0 || iy <= 0.0 {
            return 0.0;
        }
        let intersection = ix * iy;
        let union = self.width.mul_add(self.height, other.width * other.height) - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// One identified food item within a single scan.
///
/// A detection with no resolvable nutrition is retained with
/// `nutrition_resolved == false`, never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Product/food identifier, e.g. "banana" or a catalog product name
    pub label: String,
    /// Backend-reported certainty in [0, 1]
    pub confidence: f64,
    /// Which backend produced this detection
    pub source: BackendKind,
    /// Food category hint when the backend reports one ("fruit", "grain", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Spatial hint for dedup comparison; absent for barcode detections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_region: Option<BoundingRegion>,
    /// Estimated portion weight in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_weight_grams: Option<f64>,
    /// Per-100g nutrition facts, attached once resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionRecord>,
    /// Whether nutrition lookup succeeded for this label
    pub nutrition_resolved: bool,
}

impl Detection {
    /// Create a detection with the minimal required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ConfidenceOutOfRange`] when `confidence`
    /// falls outside [0, 1].
    pub fn new(
        label: impl Into<String>,
        confidence: f64,
        source: BackendKind,
    ) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::ConfidenceOutOfRange { value: confidence });
        }
        Ok(Self {
            label: label.into(),
            confidence,
            source,
            category: None,
            bounding_region: None,
            estimated_weight_grams: None,
            nutrition: None,
            nutrition_resolved: false,
        })
    }

    /// Attach a category hint
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a bounding region
    #[must_use]
    pub const fn with_region(mut self, region: BoundingRegion) -> Self {
        self.bounding_region = Some(region);
        self
    }

    /// Attach a weight estimate in grams
    #[must_use]
    pub const fn with_weight(mut self, grams: f64) -> Self {
        self.estimated_weight_grams = Some(grams);
        self
    }

    /// Attach resolved nutrition facts
    #[must_use]
    pub fn with_nutrition(mut self, nutrition: NutritionRecord) -> Self {
        self.nutrition = Some(nutrition);
        self.nutrition_resolved = true;
        self
    }
}

/// Finalized outcome of one recognition call.
///
/// Created once per orchestration, immutable after return, owned by the
/// caller. The core hands it to the scan history writer and forgets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique id for this scan
    pub id: Uuid,
    /// Merged detections, most confident first
    pub detections: Vec<Detection>,
    /// Weight-weighted average confidence of retained detections
    pub overall_confidence: f64,
    /// Backends that timed out or errored during this scan
    pub degraded_backends: Vec<BackendKind>,
    /// When the orchestration completed
    pub scan_timestamp: DateTime<Utc>,
    /// Short reference to the raw input, e.g. `barcode:4000417025005`
    pub raw_input_ref: String,
}
