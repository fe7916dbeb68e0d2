// ABOUTME: Vision-model recognition backend over an HTTP inference API
// ABOUTME: Sends base64 JPEG frames, parses structured JSON detections with weights
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Vision-model backend.
//!
//! Posts the image to a hosted vision model and asks for a structured JSON
//! inventory of every food item in frame: name, category, confidence,
//! estimated weight, and per-100g nutrition when the model can infer it.
//! Model output arrives as a text completion, so the payload is defensively
//! stripped of markdown code fences before parsing.

use crate::models::{BackendKind, BoundingRegion, Detection, NutritionRecord, ScanInput};
use crate::providers::core::{BackendConfig, RecognitionBackend};
use crate::providers::errors::BackendError;
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_MODEL: &str = "food-vision-1";

/// Instruction sent with every frame. The model must answer with JSON only;
/// the shape mirrors [`VisionAnalysis`].
const ANALYSIS_PROMPT: &str = "Identify every food product in this image. Return ONLY valid JSON:\n\
{\"products\": [{\"name\": \"...\", \"category\": \"...\", \"confidence\": 0.0,\n\
  \"estimated_weight_grams\": 0, \"bounding_box\": {\"x\": 0.0, \"y\": 0.0, \"width\": 0.0, \"height\": 0.0},\n\
  \"nutrition_per_100g\": {\"calories\": 0, \"protein\": 0, \"carbs\": 0, \"fat\": 0}}]}";

/// Recognition backend backed by a hosted vision model.
pub struct VisionModelBackend {
    config: BackendConfig,
    http: reqwest::Client,
}

impl VisionModelBackend {
    /// Create a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unavailable`] when the HTTP client cannot be
    /// built from the configuration.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn model(&self) -> &str {
        self.config.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    image_base64: String,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct VisionAnalysis {
    #[serde(default)]
    products: Vec<VisionProduct>,
}

#[derive(Debug, Deserialize)]
struct VisionProduct {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    estimated_weight_grams: Option<f64>,
    #[serde(default)]
    bounding_box: Option<VisionBox>,
    #[serde(default)]
    nutrition_per_100g: Option<VisionNutrition>,
}

#[derive(Debug, Deserialize)]
struct VisionBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct VisionNutrition {
    #[serde(default)]
    calories: f64,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    carbs: f64,
    #[serde(default)]
    fat: f64,
}

/// Model completions regularly wrap JSON in markdown fences; strip them.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn parse_analysis(content: &str) -> Result<Vec<Detection>, BackendError> {
    let analysis: VisionAnalysis = serde_json::from_str(strip_code_fences(content))
        .map_err(|e| BackendError::InvalidResponse(format!("vision payload: {e}")))?;

    let mut detections = Vec::with_capacity(analysis.products.len());
    for product in analysis.products {
        // The wire boundary normalizes model output into the model's
        // invariants: confidence clamped here so Detection construction
        // cannot fail on sloppy inference output.
        let confidence = product.confidence.clamp(0.0, 1.0);
        let Ok(mut detection) = Detection::new(product.name, confidence, BackendKind::Vision)
        else {
            continue;
        };
        if let Some(category) = product.category {
            detection = detection.with_category(category);
        }
        if let Some(weight) = product.estimated_weight_grams.filter(|w| *w > 0.0) {
            detection = detection.with_weight(weight);
        }
        if let Some(b) = product.bounding_box {
            detection = detection.with_region(BoundingRegion {
                x: b.x,
                y: b.y,
                width: b.width,
                height: b.height,
            });
        }
        if let Some(n) = product.nutrition_per_100g {
            match NutritionRecord::new(n.calories, n.protein, n.carbs, n.fat) {
                Ok(record) => detection = detection.with_nutrition(record),
                Err(err) => {
                    warn!(%err, label = %detection.label, "dropping invalid model nutrition");
                }
            }
        }
        detections.push(detection);
    }
    Ok(detections)
}

#[async_trait]
impl RecognitionBackend for VisionModelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vision
    }

    fn accepts(&self, input: &ScanInput) -> bool {
        matches!(input, ScanInput::Image { .. })
    }

    async fn detect(
        &self,
        input: &ScanInput,
        deadline: Duration,
    ) -> Result<Vec<Detection>, BackendError> {
        let ScanInput::Image {
            bytes,
            content_type,
        } = input
        else {
            return Ok(Vec::new());
        };

        let request = AnalyzeRequest {
            model: self.model(),
            prompt: ANALYSIS_PROMPT,
            image_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            content_type,
        };

        let mut builder = self
            .http
            .post(format!("{}/v1/analyze", self.config.base_url))
            .timeout(deadline)
            .json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    backend: BackendKind::Vision,
                }
            } else {
                e.into()
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(BackendError::RateLimited {
                retry_after_secs: None,
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let detections = parse_analysis(&body.content)?;
        debug!(
            model = self.model(),
            count = detections.len(),
            "vision analysis complete"
        );
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn parses_products_with_weights_and_nutrition() {
        let content = r#"{"products":[
            {"name":"banana","category":"fruit","confidence":0.92,
             "estimated_weight_grams":118,
             "bounding_box":{"x":0.1,"y":0.2,"width":0.3,"height":0.4},
             "nutrition_per_100g":{"calories":89,"protein":1.1,"carbs":23,"fat":0.3}},
            {"name":"bread","confidence":0.75}
        ]}"#;
        let detections = parse_analysis(content).expect("valid payload");
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label, "banana");
        assert_eq!(detections[0].estimated_weight_grams, Some(118.0));
        assert!(detections[0].nutrition_resolved);
        assert!(detections[0].bounding_region.is_some());
        assert!(!detections[1].nutrition_resolved);
    }

    #[test]
    fn clamps_out_of_range_model_confidence() {
        let content = r#"{"products":[{"name":"apple","confidence":1.4}]}"#;
        let detections = parse_analysis(content).expect("valid payload");
        assert!((detections[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_json_content() {
        assert!(parse_analysis("the image shows a banana").is_err());
    }
}
