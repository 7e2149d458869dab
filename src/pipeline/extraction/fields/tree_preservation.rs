//! Tree preservation orders (LLC1 charge).

use std::sync::LazyLock;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::rules::{self, negative_rule, rule, PatternRule};
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "tree_preservation_order";

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            "tpo_phrase",
            r"(?i)\btree\s+preservation\s+order\b",
            0.55,
        ),
        rule("tpo_reference", r"(?i)\bTPO\s*(?:no\.?|ref)?\s*[:\-]?\s*\d+", 0.25),
        rule(
            "protected_trees",
            r"(?i)\bprotected\s+tree(?:s)?\b",
            0.15,
        ),
        negative_rule(
            "explicit_negative",
            r"(?i)\bno\s+tree\s+preservation\s+orders?\b",
            0.70,
        ),
    ]
});

static TPO_REF: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\bTPO\s*(?:no\.?|ref)?\s*[:\-]?\s*(\d+(?:/\d+)?)")
        .expect("Invalid TPO reference pattern")
});

pub struct TreePreservationExtractor;

impl FieldExtractor for TreePreservationExtractor {
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

        // "No tree preservation orders" also matches the bare phrase; the
        // explicit negative wins.
        if scan.matched_rules.contains(&"explicit_negative") {
            scan.present = false;
        }

        let value = if scan.present {
            Some(FieldValue::Text(
                TPO_REF
                    .captures(&page.text)
                    .map(|c| format!("TPO {}", &c[1]))
                    .unwrap_or_else(|| "tree preservation order".into()),
            ))
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
