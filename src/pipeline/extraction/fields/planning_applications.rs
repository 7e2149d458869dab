//! Planning application history (CON29 enquiry 1.1).
//!
//! List-valued field. Each extracted reference is validated against the
//! standard UK planning reference shape; the valid fraction scales the
//! confidence boost. An empty list is a high-confidence negative — a
//! clean planning history is itself a finding.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "planning_applications";

/// Confidence assigned when no applications are found at all.
const NONE_FOUND_CONFIDENCE: f32 = 0.95;

/// Base confidence when at least one candidate reference appears.
const BASE_WITH_CANDIDATES: f32 = 0.50;

/// Maximum boost, scaled by the fraction of structurally valid references.
const VALID_FRACTION_BOOST: f32 = 0.40;

/// Candidate references: anything that looks like YY/NNNNN/SUFFIX or
/// YYYY/NNNN/SUFFIX. Deliberately loose — validation is separate.
static CANDIDATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{2,4}/\d{3,5}/[A-Z]{2,4}\b").expect("Invalid candidate pattern")
});

/// Strict structural rule: two- or four-digit year, four- or five-digit
/// serial, and a recognised application-type suffix.
static VALID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{2}|\d{4})/\d{4,5}/(?:FUL|OUT|LBC|ADV|COU|REM|HOU|TPO|CND)\b")
        .expect("Invalid reference pattern")
});

pub struct PlanningApplicationsExtractor;

impl PlanningApplicationsExtractor {
    fn candidates(text: &str) -> Vec<String> {
        let mut refs: Vec<String> = CANDIDATE_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        refs.sort_unstable();
        refs.dedup();
        refs
    }

    fn is_valid(reference: &str) -> bool {
        VALID_PATTERN.is_match(reference)
    }
}

impl FieldExtractor for PlanningApplicationsExtractor {
    fn field(&self) -> &'static str {
        FIELD
    }

    fn applies_to(&self, doc_type: DocumentType) -> bool {
        doc_type == DocumentType::Con29
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

        let refs = Self::candidates(&page.text);

        if refs.is_empty() {
            // Nothing found is a confident, positive signal here: the
            // enquiry was answered and the history is clean.
            return Ok(ExtractionResult::confident_negative(
                FIELD,
                NONE_FOUND_CONFIDENCE,
            ));
        }

        let valid = refs.iter().filter(|r| Self::is_valid(r)).count();
        let valid_fraction = valid as f32 / refs.len() as f32;
        let confidence =
            (BASE_WITH_CANDIDATES + VALID_FRACTION_BOOST * valid_fraction).clamp(0.0, 1.0);

        let evidence = refs.clone();

        Ok(ExtractionResult {
            field: FIELD.to_string(),
            present: true,
            value: Some(FieldValue::References(refs)),
            confidence,
            evidence,
            method: ExtractionMethod::PatternMatching,
        })
    }
}
