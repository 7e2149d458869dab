//! Flood zone classification (CON29 3.7 / drainage and water enquiries).
//!
//! The extracted zone code maps to a discrete risk tier used by
//! cross-validation against the environmental-hazard registry overlay.

use std::sync::LazyLock;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::rules::{self, negative_rule, rule, PatternRule};
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, FloodRiskTier, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "flood_zone";

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            "zone_statement",
            r"(?i)\bflood\s+zone\s+(?:1|2|3[abc]?)\b",
            0.55,
        ),
        rule(
            "risk_statement",
            r"(?i)\b(?:high|medium|low)\s+(?:probability|risk)\s+of\s+flooding\b",
            0.30,
        ),
        rule(
            "surface_water",
            r"(?i)\bsurface\s+water\s+flood(?:ing)?\b",
            0.15,
        ),
        negative_rule(
            "zone_one_negative",
            r"(?i)\bflood\s+zone\s+1\b",
            0.25,
        ),
    ]
});

static ZONE_CODE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\bflood\s+zone\s+(1|2|3[abc]?)\b").expect("Invalid zone pattern")
});

pub struct FloodZoneExtractor;

impl FloodZoneExtractor {
    /// Risk tier for an extracted zone code.
    pub fn tier(code: &str) -> FloodRiskTier {
        FloodRiskTier::from_zone_code(code)
    }
}

impl FieldExtractor for FloodZoneExtractor {
    fn field(&self) -> &'static str {
        FIELD
    }

    fn applies_to(&self, _doc_type: DocumentType) -> bool {
        true
    }

    fn extract(
        &self,
        page: &PageText,
        _layout: &LayoutData,
        _image: Option<&[u8]>,
    ) -> Result<ExtractionResult, ExtractionError> {
        if page.text.trim().is_empty() {
            return Err(ExtractionError::MalformedInput(format!(
                "page {} has no text",
                page.page_number
            )));
        }

        let scan = rules::scan(&page.text, &RULES, 0.0);

        let zone = ZONE_CODE
            .captures(&page.text)
            .map(|c| c[1].to_ascii_uppercase());

        // Zone 1 means the property is outside any flood risk area: the
        // field is a confident negative, not a present hazard.
        let (present, value) = match zone {
            Some(code) if code == "1" => (false, Some(FieldValue::ZoneCode(code))),
            Some(code) => (true, Some(FieldValue::ZoneCode(code))),
            None => (scan.present, None),
        };

        Ok(ExtractionResult {
            field: FIELD.to_string(),
            present,
            value,
            confidence: scan.confidence,
            evidence: scan.evidence,
            method: ExtractionMethod::PatternMatching,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> PageText {
        PageText {
            page_number: 1,
            text: text.to_string(),
        }
    }

    #[test]
    fn zone_3b_is_present_high_tier() {
        let result = FloodZoneExtractor
            .extract(
                &page("The land lies within Flood Zone 3B with a high probability of flooding."),
                &LayoutData::default(),
                None,
            )
            .unwrap();
        assert!(result.present);
        let Some(FieldValue::ZoneCode(code)) = &result.value else {
            panic!("Expected zone code, got {:?}", result.value);
        };
        assert_eq!(code, "3B");
        assert_eq!(FloodZoneExtractor::tier(code), FloodRiskTier::High);
        assert!(result.confidence > 0.6, "got {}", result.confidence);
    }

    #[test]
    fn zone_one_is_confident_negative() {
        let result = FloodZoneExtractor
            .extract(&page("The property is in Flood Zone 1."), &LayoutData::default(), None)
            .unwrap();
        assert!(!result.present);
        assert_eq!(result.value, Some(FieldValue::ZoneCode("1".into())));
        assert!(result.confidence > 0.4, "got {}", result.confidence);
    }

    #[test]
    fn zone_2_maps_to_medium() {
        let result = FloodZoneExtractor
            .extract(&page("Flood Zone 2 applies."), &LayoutData::default(), None)
            .unwrap();
        assert!(result.present);
        let Some(FieldValue::ZoneCode(code)) = &result.value else {
            panic!("no zone code");
        };
        assert_eq!(FloodZoneExtractor::tier(code), FloodRiskTier::Medium);
    }

    #[test]
    fn no_flood_mention_is_absent() {
        let result = FloodZoneExtractor
            .extract(&page("Standard drainage enquiries only."), &LayoutData::default(), None)
            .unwrap();
        assert!(!result.present);
        assert_eq!(result.confidence, 0.0);
    }
}
