//! Contaminated land designations (Part 2A EPA 1990; LLC1 charge and
//! CON29 3.12).

use std::sync::LazyLock;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::rules::{self, negative_rule, rule, PatternRule};
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "contaminated_land";

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            "contaminated_designation",
            r"(?i)\bcontaminated\s+land\b",
            0.50,
        ),
        rule(
            "remediation_notice",
            r"(?i)\bremediation\s+(?:notice|statement|declaration)\b",
            0.30,
        ),
        rule(
            "landfill_history",
            r"(?i)\b(?:former\s+)?landfill\b",
            0.20,
        ),
        negative_rule(
            "explicit_negative",
            r"(?i)\bno\s+entr(?:y|ies)\s+(?:in\s+the\s+)?(?:contaminated\s+land\s+)?register\b",
            0.65,
        ),
    ]
});

pub struct ContaminatedLandExtractor;

impl FieldExtractor for ContaminatedLandExtractor {
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
        let negative = scan.matched_rules.contains(&"explicit_negative");
        let present = scan.present && !negative;

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
    fn designation_with_remediation_notice() {
        let result = ContaminatedLandExtractor
            .extract(
                &page("The land is designated contaminated land; a remediation notice was served."),
                &LayoutData::default(),
                None,
            )
            .unwrap();
        assert!(result.present);
        assert!(result.confidence > 0.7, "got {}", result.confidence);
    }

    #[test]
    fn clean_register_is_negative() {
        let result = ContaminatedLandExtractor
            .extract(
                &page("No entries in the contaminated land register."),
                &LayoutData::default(),
                None,
            )
            .unwrap();
        assert!(!result.present);
        assert!(result.confidence > 0.3);
    }
}
