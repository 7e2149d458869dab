//! Conservation area designation (LLC1 Part 3 charge, also answered in
//! CON29 enquiries).

use std::sync::LazyLock;

use crate::models::DocumentType;
use crate::pipeline::extraction::registry::FieldExtractor;
use crate::pipeline::extraction::rules::{self, negative_rule, rule, PatternRule};
use crate::pipeline::extraction::types::{
    ExtractionMethod, ExtractionResult, FieldValue, LayoutData, PageText,
};
use crate::pipeline::extraction::ExtractionError;

pub const FIELD: &str = "conservation_area";

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            "within_designation",
            r"(?i)\b(?:within|inside|situated\s+in)\s+(?:a\s+|the\s+)?(?:[\w'\-]+\s+){0,4}conservation\s+area\b",
            0.55,
        ),
        rule(
            "named_designation",
            r"(?i)\bconservation\s+area\s*[:\-]\s*\w[\w\s]{2,40}\b",
            0.45,
        ),
        rule(
            "designation_order",
            r"(?i)\bdesignat(?:ed|ion)\s+(?:as\s+a\s+)?conservation\s+area\b",
            0.35,
        ),
        rule(
            "article_4_direction",
            r"(?i)\barticle\s+4\s+direction\b",
            0.15,
        ),
        negative_rule(
            "explicit_negative",
            r"(?i)\bnot\s+(?:within|in|situated\s+in)\s+(?:a\s+)?conservation\s+area\b",
            0.70,
        ),
    ]
});

/// Captures the designation name out of "Conservation Area: Riverside" or
/// "the Riverside Conservation Area".
static NAME_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)(?:conservation\s+area\s*[:\-]\s*(?P<after>[A-Z][\w\s']{2,40}?)(?:[.\n,]|$))|(?:the\s+(?P<before>[A-Z][\w\s']{2,40}?)\s+conservation\s+area)",
    )
    .expect("Invalid conservation area name pattern")
});

pub struct ConservationAreaExtractor;

impl FieldExtractor for ConservationAreaExtractor {
    fn field(&self) -> &'static str {
        FIELD
    }

    fn applies_to(&self, _doc_type: DocumentType) -> bool {
        true
    }

    fn extract(
        &self,
        page: &PageText,
        layout: &LayoutData,
        _image: Option<&[u8]>,
    ) -> Result<ExtractionResult, ExtractionError> {
        if page.text.trim().is_empty() {
            return Err(ExtractionError::MalformedInput(format!(
                "page {} has no text",
                page.page_number
            )));
        }

        let mut scan = rules::scan(&page.text, &RULES, 0.0);
        let mut method = ExtractionMethod::PatternMatching;

        // "Not within a conservation area" also matches the positive
        // phrase; the explicit negative wins.
        if scan.matched_rules.contains(&"explicit_negative") {
            scan.present = false;
        }

        // The layout model labels register charge-type cells; a matching
        // cell corroborates the pattern result.
        if scan.present {
            let layout_hit = layout
                .labelled("charge_type")
                .any(|t| t.text.to_ascii_lowercase().contains("conservation"));
            if layout_hit {
                scan.confidence = (scan.confidence + 0.05).min(1.0);
                method = ExtractionMethod::LayoutModel;
            }
        }

        let value = if scan.present {
            let name = NAME_PATTERN.captures(&page.text).and_then(|c| {
                c.name("after")
                    .or_else(|| c.name("before"))
                    .map(|m| m.as_str().trim().to_string())
            });
            Some(FieldValue::Text(
                name.unwrap_or_else(|| "conservation area".to_string()),
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
            method,
        })
    }
}
