//! Highway adoption status (CON29 enquiry 2).

use std::sync::LazyLock;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::rules::{self, negative_rule, rule, PatternRule};
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "highway_adoption";

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            "maintainable_at_public_expense",
            r"(?i)\bmaintainable\s+at\s+(?:the\s+)?public\s+expense\b",
            0.55,
        ),
        rule(
            "adopted_highway",
            r"(?i)\badopted\s+highway\b",
            0.45,
        ),
        rule(
            "section_38_agreement",
            r"(?i)\bsection\s+38\s+agreement\b",
            0.20,
        ),
        negative_rule(
            "private_street",
            r"(?i)\b(?:private\s+street|not\s+(?:an?\s+)?adopted)\b",
            0.70,
        ),
    ]
});

pub struct HighwayAdoptionExtractor;

impl FieldExtractor for HighwayAdoptionExtractor {
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

        let scan = rules::scan(&page.text, &RULES, 0.0);
        let private = scan.matched_rules.contains(&"private_street");
        let present = scan.present && !private;

        Ok(ExtractionResult {
            field: FIELD.to_string(),
            present,
            value: present.then(|| FieldValue::Flag(true)),
            confidence: scan.confidence,
            evidence: scan.evidence,
            method: ExtractionMethod::PatternMatching,
        })
    }
}
