// ABOUTME: Detection deduplication and merging across recognition backends
// ABOUTME: Lexical or spatial overlap folds candidates into one reinforced detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriScan

//! Detection merging.
//!
//! Detections from different backends are candidates for the same physical
//! item when their labels are lexically close or their bounding regions
//! overlap. Candidates merge by keeping the higher-confidence label and
//! combining confidences as independent reinforcing evidence:
//! `1 - (1-c1)(1-c2)`, which is commutative and stays below 1.
//!
//! Merging runs to a fixpoint, so re-running it on an already-merged set
//! is a no-op.

use crate::models::{BackendKind, Detection};

/// Merge thresholds, tunable policy rather than inline constants.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Normalized label similarity in [0, 1] above which two detections
    /// are the same item
    pub label_similarity_threshold: f64,
    /// Bounding-region IoU above which two detections are the same item
    pub iou_threshold: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            label_similarity_threshold: 0.82,
            iou_threshold: 0.5,
        }
    }
}

/// Combine two independent confidence observations of the same item.
///
/// Result is bounded by `[max(c1, c2), 1)` for inputs in `[0, 1)`.
#[must_use]
pub fn combine_confidence(c1: f64, c2: f64) -> f64 {
    (1.0 - (1.0 - c1) * (1.0 - c2)).clamp(0.0, 1.0)
}

/// Merge duplicate detections into one confident set.
///
/// Runs pairwise passes until no pair merges, which guarantees
/// `merge(merge(d)) == merge(d)`: the output is pairwise non-mergeable.
/// First-occurrence order of surviving detections is preserved.
#[must_use]
pub fn merge_detections(detections: Vec<Detection>, config: &MergeConfig) -> Vec<Detection> {
    let mut merged = detections;
    loop {
        let (next, changed) = merge_pass(merged, config);
        merged = next;
        if !changed {
            return merged;
        }
    }
}

/// One greedy pass: each detection folds into the first existing survivor
/// it matches, otherwise it survives on its own.
fn merge_pass(detections: Vec<Detection>, config: &MergeConfig) -> (Vec<Detection>, bool) {
    let mut survivors: Vec<Detection> = Vec::with_capacity(detections.len());
    let mut changed = false;
    for detection in detections {
        if let Some(existing) = survivors
            .iter_mut()
            .find(|s| same_item(s, &detection, config))
        {
            merge_into(existing, detection);
            changed = true;
        } else {
            survivors.push(detection);
        }
    }
    (survivors, changed)
}

/// Two detections describe the same physical item when labels are close or
/// regions (both present) overlap enough.
fn same_item(a: &Detection, b: &Detection, config: &MergeConfig) -> bool {
    if label_similarity(&a.label, &b.label) >= config.label_similarity_threshold {
        return true;
    }
    match (&a.bounding_region, &b.bounding_region) {
        (Some(ra), Some(rb)) => ra.iou(rb) >= config.iou_threshold,
        _ => false,
    }
}

/// Fold `incoming` into `existing` in place.
fn merge_into(existing: &mut Detection, incoming: Detection) {
    let existing_wins = match existing
        .confidence
        .partial_cmp(&incoming.confidence)
        .unwrap_or(std::cmp::Ordering::Equal)
    {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        // Equal confidence: a catalog-derived label beats visual inference.
        std::cmp::Ordering::Equal => existing.source <= incoming.source,
    };

    let combined = combine_confidence(existing.confidence, incoming.confidence);

    let winner_label;
    let winner_source;
    let winner_category;
    if existing_wins {
        winner_label = existing.label.clone();
        winner_source = existing.source;
        winner_category = existing.category.clone().or(incoming.category);
    } else {
        winner_label = incoming.label.clone();
        winner_source = incoming.source;
        winner_category = incoming.category.or_else(|| existing.category.clone());
    }

    existing.estimated_weight_grams = match (
        existing.estimated_weight_grams,
        incoming.estimated_weight_grams,
    ) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(a), None) => Some(a),
        (None, b) => b,
    };

    // The winner's spatial hint is kept; the loser's is evidence already
    // consumed by the match decision.
    if !existing_wins {
        if incoming.bounding_region.is_some() {
            existing.bounding_region = incoming.bounding_region;
        }
    } else if existing.bounding_region.is_none() {
        existing.bounding_region = incoming.bounding_region;
    }

    // Resolved nutrition survives a merge regardless of which label won;
    // catalog-sourced records are preferred over model estimates.
    match (&existing.nutrition, incoming.nutrition) {
        (_, Some(incoming_nutrition))
            if !existing.nutrition_resolved
                || incoming.source == BackendKind::Barcode =>
        {
            existing.nutrition = Some(incoming_nutrition);
            existing.nutrition_resolved = true;
        }
        _ => {}
    }
    if incoming.nutrition_resolved {
        existing.nutrition_resolved = true;
    }

    existing.label = winner_label;
    existing.source = winner_source;
    existing.category = winner_category;
    existing.confidence = combined;
}

/// Aggregate confidence of a merged set: average weighted by estimated
/// weight, with uniform weight 1.0 for detections lacking an estimate.
#[must_use]
pub fn overall_confidence(detections: &[Detection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let mut weighted = 0.0;
    let mut total = 0.0;
    for d in detections {
        let w = d.estimated_weight_grams.unwrap_or(1.0);
        weighted += d.confidence * w;
        total += w;
    }
    if total <= 0.0 {
        0.0
    } else {
        weighted / total
    }
}

/// Normalized lexical similarity in [0, 1]: 1 minus the Levenshtein
/// distance over the longer label length, on case/whitespace-folded text.
#[must_use]
pub fn label_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_label(a);
    let b = normalize_label(b);
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Classic two-row Levenshtein over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingRegion;

    fn det(label: &str, confidence: f64, source: BackendKind) -> Detection {
        Detection::new(label, confidence, source).expect("valid confidence")
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("banana", "banana"), 0);
        assert_eq!(levenshtein("banana", "bananas"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn similarity_folds_case_and_whitespace() {
        assert!((label_similarity("Banana", " banana ") - 1.0).abs() < 1e-9);
        assert!(label_similarity("banana", "bananas") > 0.85);
        assert!(label_similarity("banana", "bread") < 0.5);
    }

    #[test]
    fn combine_is_commutative_and_bounded() {
        let c = combine_confidence(0.7, 0.4);
        assert!((c - combine_confidence(0.4, 0.7)).abs() < 1e-12);
        assert!(c >= 0.7 && c < 1.0);
    }

    #[test]
    fn merges_same_label_from_two_backends() {
        let merged = merge_detections(
            vec![
                det("banana", 0.9, BackendKind::Vision),
                det("banana", 0.8, BackendKind::Synthetic),
            ],
            &MergeConfig::default(),
        );
        assert_eq!(merged.len(), 1);
        assert!((merged[0].confidence - 0.98).abs() < 1e-9);
        assert_eq!(merged[0].source, BackendKind::Vision);
    }

    #[test]
    fn merges_by_region_overlap_despite_label_disagreement() {
        let region = BoundingRegion {
            x: 0.1,
            y: 0.1,
            width: 0.3,
            height: 0.3,
        };
        let merged = merge_detections(
            vec![
                det("granny smith", 0.6, BackendKind::Vision).with_region(region),
                det("green apple", 0.7, BackendKind::Vision).with_region(region),
            ],
            &MergeConfig::default(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].label, "green apple");
    }

    #[test]
    fn averages_weights_when_both_present() {
        let merged = merge_detections(
            vec![
                det("banana", 0.9, BackendKind::Vision).with_weight(120.0),
                det("banana", 0.8, BackendKind::Synthetic).with_weight(100.0),
            ],
            &MergeConfig::default(),
        );
        assert_eq!(merged[0].estimated_weight_grams, Some(110.0));
    }

    #[test]
    fn equal_confidence_tie_prefers_barcode_label() {
        let merged = merge_detections(
            vec![
                det("banan", 0.9, BackendKind::Vision),
                det("Banana Brand X", 0.9, BackendKind::Barcode),
            ],
            &MergeConfig {
                label_similarity_threshold: 0.3,
                ..MergeConfig::default()
            },
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, BackendKind::Barcode);
        assert_eq!(merged[0].label, "Banana Brand X");
    }

    #[test]
    fn merge_is_idempotent_across_label_chains() {
        // b matches a, and the surviving label shifts toward c's; a second
        // merge must not find new pairs.
        let detections = vec![
            det("fruit salad", 0.5, BackendKind::Vision),
            det("fruit salat", 0.6, BackendKind::Vision),
            det("fruit salads", 0.9, BackendKind::Synthetic),
        ];
        let once = merge_detections(detections, &MergeConfig::default());
        let twice = merge_detections(once.clone(), &MergeConfig::default());
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.label, b.label);
            assert!((a.confidence - b.confidence).abs() < 1e-12);
        }
    }

    #[test]
    fn overall_confidence_weights_by_grams() {
        let detections = vec![
            det("banana", 1.0, BackendKind::Barcode).with_weight(300.0),
            det("grape", 0.5, BackendKind::Vision).with_weight(100.0),
        ];
        // (1.0*300 + 0.5*100) / 400 = 0.875
        assert!((overall_confidence(&detections) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn overall_confidence_uses_uniform_weight_when_absent() {
        let detections = vec![
            det("banana", 0.9, BackendKind::Vision),
            det("bread", 0.5, BackendKind::Vision),
        ];
        assert!((overall_confidence(&detections) - 0.7).abs() < 1e-9);
    }
}
