//! Core types for field extraction.
//!
//! These model one page's journey through the extractors:
//! PageText + LayoutData → ExtractionResult per field.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Page input
// ═══════════════════════════════════════════

/// Plain text of one document page, as produced by the OCR/layout
/// collaborator.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
}

/// Token-level layout classification for one page, as produced by the
/// layout model collaborator. May be empty when only raw text is
/// available — extractors degrade to pattern matching alone.
#[derive(Debug, Clone, Default)]
pub struct LayoutData {
    pub tokens: Vec<LayoutToken>,
}

/// One classified token from the layout model.
#[derive(Debug, Clone)]
pub struct LayoutToken {
    pub text: String,
    /// Semantic label assigned by the model, e.g. "charge_type",
    /// "register_part", "answer_cell".
    pub label: String,
    pub confidence: f32,
}

impl LayoutData {
    /// All tokens carrying the given label, in page order.
    pub fn labelled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a LayoutToken> {
        self.tokens.iter().filter(move |t| t.label == label)
    }
}

// ═══════════════════════════════════════════
// Extraction output
// ═══════════════════════════════════════════

/// How a result was obtained. Pattern matching is the workhorse; the
/// layout model and contextual analysis refine it where available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    PatternMatching,
    LayoutModel,
    ContextualAnalysis,
}

/// Structured payload of an extracted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    ZoneCode(String),
    References(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    /// True when the payload carries actual content — used by the scoring
    /// engine's data-completeness computation.
    pub fn is_meaningful(&self) -> bool {
        match self {
            Self::Text(s) | Self::ZoneCode(s) => !s.trim().is_empty(),
            Self::References(refs) => !refs.is_empty(),
            Self::Flag(_) => true,
        }
    }
}

/// Discrete flood risk tier, mapped from the extracted zone code and used
/// by cross-validation against the environmental-hazard registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloodRiskTier {
    Low,
    Medium,
    High,
}

impl FloodRiskTier {
    /// Zone "1" is low risk, "2"/"3A" medium, "3B"/"3C" high. Unknown
    /// codes are treated as medium rather than dropped.
    pub fn from_zone_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "1" => Self::Low,
            "2" | "3A" => Self::Medium,
            "3B" | "3C" => Self::High,
            _ => Self::Medium,
        }
    }
}

/// The result of running one field extractor over one page, or the merged
/// per-document result after page aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub field: String,
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    pub confidence: f32,
    pub evidence: Vec<String>,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    /// Zero-value result for an extractor that could not run. Never an
    /// error past the document processor boundary.
    pub fn absent(field: &str) -> Self {
        Self {
            field: field.to_string(),
            present: false,
            value: None,
            confidence: 0.0,
            evidence: Vec::new(),
            method: ExtractionMethod::PatternMatching,
        }
    }

    /// Confident negative: the document was searched and the field is
    /// genuinely not there. "Nothing found" is a positive signal, not a
    /// failure.
    pub fn confident_negative(field: &str, confidence: f32) -> Self {
        Self {
            field: field.to_string(),
            present: false,
            value: None,
            confidence: confidence.clamp(0.0, 1.0),
            evidence: Vec::new(),
            method: ExtractionMethod::PatternMatching,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_tier_mapping() {
        assert_eq!(FloodRiskTier::from_zone_code("1"), FloodRiskTier::Low);
        assert_eq!(FloodRiskTier::from_zone_code("2"), FloodRiskTier::Medium);
        assert_eq!(FloodRiskTier::from_zone_code("3a"), FloodRiskTier::Medium);
        assert_eq!(FloodRiskTier::from_zone_code("3B"), FloodRiskTier::High);
        assert_eq!(FloodRiskTier::from_zone_code("3C"), FloodRiskTier::High);
        assert_eq!(FloodRiskTier::from_zone_code("9"), FloodRiskTier::Medium);
    }

    #[test]
    fn absent_result_is_zero_confidence() {
        let result = ExtractionResult::absent("conservation_area");
        assert!(!result.present);
        assert_eq!(result.confidence, 0.0);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn confident_negative_clamps() {
        let result = ExtractionResult::confident_negative("planning_applications", 1.3);
        assert_eq!(result.confidence, 1.0);
        assert!(!result.present);
    }

    #[test]
    fn meaningful_values() {
        assert!(FieldValue::ZoneCode("3B".into()).is_meaningful());
        assert!(!FieldValue::Text("   ".into()).is_meaningful());
        assert!(!FieldValue::References(vec![]).is_meaningful());
        assert!(FieldValue::Flag(false).is_meaningful());
    }

    #[test]
    fn layout_data_filters_by_label() {
        let layout = LayoutData {
            tokens: vec![
                LayoutToken {
                    text: "Conservation Area".into(),
                    label: "charge_type".into(),
                    confidence: 0.9,
                },
                LayoutToken {
                    text: "Part 3".into(),
                    label: "register_part".into(),
                    confidence: 0.8,
                },
            ],
        };
        assert_eq!(layout.labelled("charge_type").count(), 1);
        assert_eq!(layout.labelled("answer_cell").count(), 0);
    }
}
