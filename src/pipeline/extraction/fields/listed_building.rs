//! Listed building status (LLC1 Part 10 charge).

use std::sync::LazyLock;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::rules::{self, negative_rule, rule, PatternRule};
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "listed_building";

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            "grade_listing",
            r"(?i)\bgrade\s+(?:I{1,3}|II\*?|1|2\*?)\s+listed\b",
            0.60,
        ),
        rule(
            "listed_building_phrase",
            r"(?i)\blisted\s+building\b",
            0.30,
        ),
        rule(
            "listing_entry",
            r"(?i)\blist\s+entry\s+(?:number|no\.?)\s*[:\-]?\s*\d{6,7}\b",
            0.20,
        ),
        negative_rule(
            "explicit_negative",
            r"(?i)\b(?:not\s+(?:a\s+)?listed|no\s+listed\s+building)\b",
            0.70,
        ),
    ]
});

static GRADE_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\bgrade\s+(I{1,3}\*?|II\*?|1|2\*?)\s+listed\b")
        .expect("Invalid grade pattern")
});

pub struct ListedBuildingExtractor;

impl FieldExtractor for ListedBuildingExtractor {
    fn field(&self) -> &'static str {
        FIELD
    }

    fn applies_to(&self, doc_type: DocumentType) -> bool {
        doc_type == DocumentType::Llc1
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

        let mut scan = rules::scan(&page.text, &RULES, 0.0);

        // "No listed building" also matches the bare phrase; the explicit
        // negative wins.
        if scan.matched_rules.contains(&"explicit_negative") {
            scan.present = false;
        }

        let value = if scan.present {
            let grade = GRADE_PATTERN
                .captures(&page.text)
                .map(|c| format!("Grade {}", c[1].to_ascii_uppercase()));
            Some(FieldValue::Text(grade.unwrap_or_else(|| "listed".into())))
        } else {
            None
        };

        Ok(ExtractionResult {
            field: FIELD.to_string(),
            present: scan.present,
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
    fn grade_two_listing_extracted() {
        let result = ListedBuildingExtractor
            .extract(
                &page("The building is Grade II listed, list entry number 1234567."),
                &LayoutData::default(),
                None,
            )
            .unwrap();
        assert!(result.present);
        assert!(result.confidence > 0.7, "got {}", result.confidence);
        assert_eq!(result.value, Some(FieldValue::Text("Grade II".into())));
        // grade_listing + listing_entry both matched
        assert_eq!(result.evidence.len(), 2);
    }

    #[test]
    fn negative_statement_not_present() {
        let result = ListedBuildingExtractor
            .extract(
                &page("There is no listed building on the land."),
                &LayoutData::default(),
                None,
            )
            .unwrap();
        assert!(!result.present);
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn only_applies_to_llc1() {
        assert!(ListedBuildingExtractor.applies_to(DocumentType::Llc1));
        assert!(!ListedBuildingExtractor.applies_to(DocumentType::Con29));
    }
}
