//! The confidence scoring engine.
//!
//! Combines up to four contributions per field — calibrated extraction
//! confidence, cross-validation against the spatial overlay, a
//! document-quality derate, and field-specific authoritative-source
//! bonuses — then aggregates into the case-level QualityMetrics and the
//! automation decision.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::QualityMetrics;
use crate::pipeline::extraction::types::ExtractionResult;
use crate::pipeline::spatial::types::SpatialOverlayResult;

use super::calibration::{calibration_factor, AccuracyStore};
use super::weights::{field_weight, CRITICAL_FIELDS, FIELD_WEIGHTS};

/// Confidence thresholds for the automation decision.
pub mod thresholds {
    /// Overall confidence below this forces manual review.
    pub const HIGH: f32 = 0.85;

    /// Any critical field below this forces manual review.
    pub const MEDIUM: f32 = 0.70;

    /// Processing quality below this forces manual review.
    pub const PROCESSING_QUALITY_MIN: f32 = 0.70;
}

/// Cross-validation adjustments. Disagreement between independent sources
/// is the strongest negative signal in the system.
const BOTH_PRESENT_BOOST: f32 = 0.20;
const BOTH_ABSENT_BOOST: f32 = 0.15;
const DISAGREEMENT_PENALTY: f32 = 0.28;

/// Document-quality derating.
const LOW_QUALITY_PENALTY: f32 = 0.05;
const HIGH_QUALITY_BONUS: f32 = 0.05;

/// Extra boost when the flood value is corroborated by the canonical
/// environmental-hazard registry, on top of generic cross-validation.
const FLOOD_AUTHORITATIVE_BONUS: f32 = 0.05;

/// Agreement scores for the case-level cross-validation metric.
const AGREEMENT_SCORE: f32 = 0.8;
const DISAGREEMENT_SCORE: f32 = 0.3;
const NO_SPATIAL_SCORE: f32 = 0.5;

/// Extraction field ↔ spatial layer pairs eligible for cross-validation.
const FIELD_LAYER_PAIRS: [(&str, &str); 7] = [
    ("conservation_area", "conservation_areas"),
    ("listed_building", "listed_buildings"),
    ("flood_zone", "flood_zones"),
    ("tree_preservation_order", "tree_preservation_orders"),
    ("contaminated_land", "contaminated_land"),
    ("highway_adoption", "highway_adoption"),
    ("enforcement_notices", "planning_constraints"),
];

/// Quality sub-scores for the processed documents. Each defaults to 0.5
/// when unavailable.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuality {
    pub ocr_quality: Option<f32>,
    pub image_quality: Option<f32>,
    pub layout_quality: Option<f32>,
    pub text_completeness: Option<f32>,
}

pub struct ConfidenceScoringEngine {
    accuracy: Arc<dyn AccuracyStore>,
}

impl ConfidenceScoringEngine {
    pub fn new(accuracy: Arc<dyn AccuracyStore>) -> Self {
        Self { accuracy }
    }

    /// Score one case. Total: every input combination produces metrics.
    pub fn score(
        &self,
        fields: &BTreeMap<String, ExtractionResult>,
        spatial: Option<&SpatialOverlayResult>,
        quality: Option<&DocumentQuality>,
    ) -> QualityMetrics {
        let mut field_confidences = BTreeMap::new();
        for (field, extraction) in fields {
            let confidence = self.field_confidence(field, extraction, spatial, quality);
            field_confidences.insert(field.clone(), confidence);
        }

        let overall_confidence = overall(&field_confidences);
        let processing_quality = processing_quality(quality);
        let data_completeness = data_completeness(fields);
        let cross_validation_score = cross_validation(fields, spatial);

        let manual_review_required = overall_confidence < thresholds::HIGH
            || CRITICAL_FIELDS.iter().any(|field| {
                field_confidences
                    .get(*field)
                    .is_some_and(|c| *c < thresholds::MEDIUM)
            })
            || processing_quality < thresholds::PROCESSING_QUALITY_MIN;

        let automation_rate = automation_rate(overall_confidence, manual_review_required);

        tracing::debug!(
            overall_confidence,
            processing_quality,
            manual_review_required,
            automation_rate,
            "Case scored"
        );

        QualityMetrics {
            overall_confidence,
            field_confidences,
            processing_quality,
            data_completeness,
            cross_validation_score,
            manual_review_required,
            automation_rate,
        }
    }

    fn field_confidence(
        &self,
        field: &str,
        extraction: &ExtractionResult,
        spatial: Option<&SpatialOverlayResult>,
        quality: Option<&DocumentQuality>,
    ) -> f32 {
        let mut confidence =
            extraction.confidence * calibration_factor(self.accuracy.as_ref(), field);

        if let Some(check) = spatial.and_then(|s| valid_layer_for(field, s)) {
            if extraction.present == check.intersects {
                confidence += if check.intersects {
                    BOTH_PRESENT_BOOST
                } else {
                    BOTH_ABSENT_BOOST
                };
            } else {
                confidence -= DISAGREEMENT_PENALTY;
            }

            if field == "flood_zone" && is_authoritative(check) {
                confidence += FLOOD_AUTHORITATIVE_BONUS;
            }
        }

        if let Some(basis) = derate_basis(quality) {
            if basis < 0.7 {
                confidence -= LOW_QUALITY_PENALTY;
            } else if basis > 0.9 {
                confidence += HIGH_QUALITY_BONUS;
            }
        }

        confidence.clamp(0.0, 1.0)
    }
}

/// The overlay check paired with a field, only when it actually ran.
fn valid_layer_for<'a>(
    field: &str,
    spatial: &'a SpatialOverlayResult,
) -> Option<&'a crate::pipeline::spatial::types::LayerCheck> {
    let (_, layer) = FIELD_LAYER_PAIRS.iter().find(|(f, _)| *f == field)?;
    spatial.layer(layer).filter(|check| check.error.is_none())
}

fn is_authoritative(check: &crate::pipeline::spatial::types::LayerCheck) -> bool {
    check
        .attributes
        .get("source")
        .and_then(|v| v.as_str())
        .is_some_and(|s| s == "environment_agency")
}

/// Mean of the OCR/image quality signals, when any are available.
fn derate_basis(quality: Option<&DocumentQuality>) -> Option<f32> {
    let q = quality?;
    let signals: Vec<f32> = [q.ocr_quality, q.image_quality]
        .into_iter()
        .flatten()
        .collect();
    if signals.is_empty() {
        None
    } else {
        Some(signals.iter().sum::<f32>() / signals.len() as f32)
    }
}

/// Weighted mean over the field-weight table; unseen fields contribute at
/// the default weight and so cannot dominate.
fn overall(field_confidences: &BTreeMap<String, f32>) -> f32 {
    if field_confidences.is_empty() {
        return 0.0;
    }
    let mut weighted = 0.0f32;
    let mut total_weight = 0.0f32;
    for (field, confidence) in field_confidences {
        let weight = field_weight(field);
        weighted += confidence * weight;
        total_weight += weight;
    }
    weighted / total_weight
}

/// Unweighted mean of the four quality sub-scores, each defaulting to 0.5.
fn processing_quality(quality: Option<&DocumentQuality>) -> f32 {
    let q = quality.cloned().unwrap_or_default();
    let scores = [
        q.ocr_quality.unwrap_or(0.5),
        q.image_quality.unwrap_or(0.5),
        q.layout_quality.unwrap_or(0.5),
        q.text_completeness.unwrap_or(0.5),
    ];
    scores.iter().sum::<f32>() / scores.len() as f32
}

/// Fraction of the weight table's fields with any meaningful extraction:
/// a presence flag, a meaningful value, or a confident negative.
fn data_completeness(fields: &BTreeMap<String, ExtractionResult>) -> f32 {
    let covered = FIELD_WEIGHTS
        .iter()
        .filter(|(name, _)| {
            fields.get(*name).is_some_and(|r| {
                r.present
                    || r.value.as_ref().is_some_and(|v| v.is_meaningful())
                    || r.confidence > 0.0
            })
        })
        .count();
    covered as f32 / FIELD_WEIGHTS.len() as f32
}

/// Mean agreement over the fixed field↔layer pairs; 0.5 when no spatial
/// data exists at all.
fn cross_validation(
    fields: &BTreeMap<String, ExtractionResult>,
    spatial: Option<&SpatialOverlayResult>,
) -> f32 {
    let Some(spatial) = spatial else {
        return NO_SPATIAL_SCORE;
    };

    let mut scores = Vec::new();
    for (field, layer) in FIELD_LAYER_PAIRS {
        let (Some(extraction), Some(check)) = (fields.get(field), spatial.layer(layer)) else {
            continue;
        };
        if check.error.is_some() {
            continue;
        }
        scores.push(if extraction.present == check.intersects {
            AGREEMENT_SCORE
        } else {
            DISAGREEMENT_SCORE
        });
    }

    if scores.is_empty() {
        NO_SPATIAL_SCORE
    } else {
        scores.iter().sum::<f32>() / scores.len() as f32
    }
}

/// Automation rate mapping. Manual review forces 0.0; otherwise the rate
/// is one of the fixed discrete tiers.
pub fn automation_rate(overall_confidence: f32, manual_review_required: bool) -> f32 {
    if manual_review_required {
        return 0.0;
    }
    if overall_confidence >= 0.95 {
        0.98
    } else if overall_confidence >= 0.85 {
        0.92
    } else if overall_confidence >= 0.70 {
        0.75
    } else {
        0.0
    }
}
