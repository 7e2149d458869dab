//! Structured legal findings: one record per finding category, derived
//! from the merged extraction + spatial data after scoring.
//!
//! When spatial analysis failed entirely, the affected categories carry a
//! fixed fallback response routing them to human review.

use std::collections::BTreeMap;

use crate::models::{QualityMetrics, StructuredFinding};
use crate::pipeline::extraction::types::{ExtractionResult, FieldValue};
use crate::pipeline::spatial::types::SpatialOverlayResult;

/// Finding category → spatial layer corroborating it (where one exists).
const CATEGORY_LAYERS: [(&str, Option<&str>); 8] = [
    ("conservation_area", Some("conservation_areas")),
    ("listed_building", Some("listed_buildings")),
    ("flood_zone", Some("flood_zones")),
    ("tree_preservation_order", Some("tree_preservation_orders")),
    ("contaminated_land", Some("contaminated_land")),
    ("highway_adoption", Some("highway_adoption")),
    ("enforcement_notices", Some("planning_constraints")),
    ("planning_applications", None),
];

const SOURCE_EXTRACTION: &str = "document_extraction";
const SOURCE_SPATIAL: &str = "spatial_overlay";

/// Fallback wording used when no spatial data is available for a
/// category that normally gets spatial corroboration.
fn fallback_response(category: &str) -> String {
    format!(
        "Spatial verification for {} was unavailable; this finding requires manual review.",
        category.replace('_', " ")
    )
}

/// Derive the structured findings map for a case.
pub fn derive(
    fields: &BTreeMap<String, ExtractionResult>,
    spatial: Option<&SpatialOverlayResult>,
    metrics: &QualityMetrics,
) -> BTreeMap<String, StructuredFinding> {
    let mut findings = BTreeMap::new();

    for (category, layer) in CATEGORY_LAYERS {
        let extraction = fields.get(category);
        let check = layer
            .and_then(|l| spatial.and_then(|s| s.layer(l)))
            .filter(|c| c.error.is_none());

        if extraction.is_none() && check.is_none() && spatial.is_some() {
            // Nothing knows about this category; skip rather than invent.
            continue;
        }

        let extracted_present = extraction.map(|e| e.present).unwrap_or(false);
        let spatial_present = check.map(|c| c.intersects).unwrap_or(false);
        let present = extracted_present || spatial_present;

        let mut sources = Vec::new();
        if extraction.is_some_and(|e| e.confidence > 0.0) {
            sources.push(SOURCE_EXTRACTION.to_string());
        }
        if check.is_some() {
            sources.push(SOURCE_SPATIAL.to_string());
        }

        // Scored confidence where the field went through the engine,
        // otherwise the capped layer confidence stands alone.
        let confidence = metrics
            .field_confidences
            .get(category)
            .copied()
            .or_else(|| check.map(|c| c.confidence))
            .unwrap_or(0.0);

        let value = extraction.and_then(|e| e.value.clone()).map(field_value_json);

        let spatial_expected = layer.is_some();
        let response = if spatial_expected && spatial.is_none() {
            Some(fallback_response(category))
        } else {
            Some(response_text(category, present))
        };

        findings.insert(
            category.to_string(),
            StructuredFinding {
                present,
                value,
                confidence,
                sources,
                response,
            },
        );
    }

    findings
}

/// Pre-drafted response text per finding, keyed by category.
pub fn automated_responses(
    findings: &BTreeMap<String, StructuredFinding>,
) -> BTreeMap<String, String> {
    findings
        .iter()
        .filter_map(|(category, finding)| {
            finding.response.clone().map(|r| (category.clone(), r))
        })
        .collect()
}

fn response_text(category: &str, present: bool) -> String {
    let name = category.replace('_', " ");
    if present {
        format!("A {name} entry affects this property; details are set out in the findings.")
    } else {
        format!("No {name} entries were identified for this property.")
    }
}

fn field_value_json(value: FieldValue) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::pipeline::extraction::types::ExtractionMethod;
    use crate::pipeline::spatial::types::{
        GeocodeSource, LayerCheck, PropertyPoint, ResolvedLocation,
    };

    fn extraction(field: &str, present: bool, confidence: f32) -> ExtractionResult {
        ExtractionResult {
            field: field.to_string(),
            present,
            value: present.then(|| FieldValue::Flag(true)),
            confidence,
            evidence: vec![],
            method: ExtractionMethod::PatternMatching,
        }
    }

    fn metrics_with(field: &str, confidence: f32) -> QualityMetrics {
        let mut field_confidences = BTreeMap::new();
        field_confidences.insert(field.to_string(), confidence);
        QualityMetrics {
            overall_confidence: confidence,
            field_confidences,
            processing_quality: 0.9,
            data_completeness: 0.5,
            cross_validation_score: 0.8,
            manual_review_required: false,
            automation_rate: 0.92,
        }
    }

    fn spatial(layer: &str, intersects: bool) -> SpatialOverlayResult {
        SpatialOverlayResult {
            location: ResolvedLocation {
                point: PropertyPoint {
                    easting: 0.0,
                    northing: 0.0,
                },
                confidence: 1.0,
                source: GeocodeSource::ExplicitCoordinates,
            },
            layers: vec![LayerCheck {
                layer: layer.to_string(),
                intersects,
                confidence: 0.9,
                attributes: serde_json::Value::Null,
                error: None,
            }],
            buffers: BTreeMap::new(),
            confidences: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    #[test]
    fn finding_carries_both_sources_when_both_agree() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "conservation_area".to_string(),
            extraction("conservation_area", true, 0.8),
        );
        let spatial = spatial("conservation_areas", true);
        let metrics = metrics_with("conservation_area", 0.91);

        let findings = derive(&fields, Some(&spatial), &metrics);
        let finding = &findings["conservation_area"];
        assert!(finding.present);
        assert!((finding.confidence - 0.91).abs() < 1e-6);
        assert_eq!(
            finding.sources,
            vec![SOURCE_EXTRACTION.to_string(), SOURCE_SPATIAL.to_string()]
        );
    }

    #[test]
    fn spatial_only_finding_uses_layer_confidence() {
        let fields = BTreeMap::new();
        let spatial = spatial("flood_zones", true);
        let metrics = metrics_with("unrelated", 0.5);

        let findings = derive(&fields, Some(&spatial), &metrics);
        let finding = &findings["flood_zone"];
        assert!(finding.present);
        assert_eq!(finding.sources, vec![SOURCE_SPATIAL.to_string()]);
        assert!((finding.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn missing_spatial_substitutes_fallback_responses() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "listed_building".to_string(),
            extraction("listed_building", false, 0.7),
        );
        let metrics = metrics_with("listed_building", 0.56);

        let findings = derive(&fields, None, &metrics);
        let finding = &findings["listed_building"];
        let response = finding.response.as_ref().unwrap();
        assert!(
            response.contains("manual review"),
            "fallback response expected, got: {response}"
        );
    }

    #[test]
    fn automated_responses_cover_every_finding() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "conservation_area".to_string(),
            extraction("conservation_area", false, 0.9),
        );
        let metrics = metrics_with("conservation_area", 0.85);
        let findings = derive(&fields, None, &metrics);
        let responses = automated_responses(&findings);
        assert_eq!(responses.len(), findings.len());
    }

    #[test]
    fn unknown_categories_skipped_when_spatial_present() {
        let fields = BTreeMap::new();
        let spatial = spatial("conservation_areas", false);
        let metrics = metrics_with("x", 0.5);
        let findings = derive(&fields, Some(&spatial), &metrics);
        // Only the category whose layer actually ran appears.
        assert!(findings.contains_key("conservation_area"));
        assert!(!findings.contains_key("flood_zone"));
    }
}
