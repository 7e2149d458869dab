//! Planning enforcement and stop notices (CON29 enquiry 1.2).
//!
//! A critical field: an outstanding enforcement notice can make a
//! property unmortgageable, so disagreement with the planning-constraints
//! overlay weighs heavily in scoring.

use std::sync::LazyLock;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::rules::{self, negative_rule, rule, PatternRule};
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "enforcement_notices";

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            "enforcement_notice",
            r"(?i)\benforcement\s+notice\b",
            0.55,
        ),
        rule("stop_notice", r"(?i)\bstop\s+notice\b", 0.35),
        rule(
            "breach_of_condition",
            r"(?i)\bbreach\s+of\s+condition\s+notice\b",
            0.35,
        ),
        negative_rule(
            "explicit_negative",
            r"(?i)\bno\s+(?:outstanding\s+)?enforcement\s+(?:notices?|action)\b",
            0.70,
        ),
    ]
});

pub struct EnforcementNoticesExtractor;

impl FieldExtractor for EnforcementNoticesExtractor {
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

        // "No enforcement notices" matches both the positive phrase and
        // the explicit negative; the negative takes precedence.
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
    fn outstanding_notice_detected() {
        let result = EnforcementNoticesExtractor
            .extract(
                &page("An enforcement notice was served on 3 May 2021 under section 172."),
                &LayoutData::default(),
                None,
            )
            .unwrap();
        assert!(result.present);
        assert!(result.confidence > 0.5, "got {}", result.confidence);
        assert_eq!(result.value, Some(FieldValue::Flag(true)));
    }

    #[test]
    fn explicit_negative_wins_over_phrase_match() {
        let result = EnforcementNoticesExtractor
            .extract(
                &page("There are no outstanding enforcement notices affecting the property."),
                &LayoutData::default(),
                None,
            )
            .unwrap();
        assert!(!result.present, "negative wording must not flag presence");
        assert!(result.confidence > 0.4, "got {}", result.confidence);
    }

    #[test]
    fn stop_notice_counts() {
        let result = EnforcementNoticesExtractor
            .extract(&page("A stop notice is in force."), &LayoutData::default(), None)
            .unwrap();
        assert!(result.present);
    }
}
