//! Shared pattern-rule engine behind every field extractor.
//!
//! Each field declares an ordered list of compiled rules, each carrying a
//! confidence contribution. A scan starts from a base confidence, adds the
//! contribution of every matching rule, then applies the shared
//! corroboration/hedging adjustments and clamps into [0,1].

use std::sync::LazyLock;

use regex::Regex;

/// Added once when any corroborating phrase appears near the findings.
pub const CORROBORATION_BOOST: f32 = 0.15;

/// Subtracted once when any hedging phrase appears — uncertain wording in
/// a register entry lowers trust in the whole extraction.
pub const HEDGING_PENALTY: f32 = 0.10;

/// Characters of surrounding context kept around each match in the
/// evidence list.
const SNIPPET_CONTEXT: usize = 40;

/// A compiled pattern with its confidence contribution.
pub struct PatternRule {
    pub name: &'static str,
    pub regex: Regex,
    pub contribution: f32,
    /// Whether a match marks the field as present. Negative-statement
    /// rules ("not within a conservation area") contribute confidence
    /// without asserting presence.
    pub marks_present: bool,
}

pub fn rule(name: &'static str, regex_str: &str, contribution: f32) -> PatternRule {
    PatternRule {
        name,
        regex: Regex::new(regex_str).expect("Invalid field rule pattern"),
        contribution,
        marks_present: true,
    }
}

pub fn negative_rule(name: &'static str, regex_str: &str, contribution: f32) -> PatternRule {
    PatternRule {
        name,
        regex: Regex::new(regex_str).expect("Invalid field rule pattern"),
        contribution,
        marks_present: false,
    }
}

/// Phrases that strengthen a finding: explicit register references,
/// statutory citations, definitive confirmations.
static CORROBORATING_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:entered\s+in\s+the\s+register|register\s+of\s+local\s+land\s+charges|pursuant\s+to|under\s+section\s+\d+|confirmed\s+by\s+the\s+council|formally\s+designated|statutory\s+designation)\b",
    )
    .expect("Invalid corroboration pattern")
});

/// Phrases that weaken a finding: hedged or unresolved wording.
static HEDGING_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:may\s+be\s+subject|possibly|appears\s+to|unverified|awaiting\s+confirmation|subject\s+to\s+review|cannot\s+be\s+confirmed|records\s+are\s+incomplete)\b",
    )
    .expect("Invalid hedging pattern")
});

/// Outcome of scanning one page's text against a field's rule list.
#[derive(Debug, Clone, Default)]
pub struct PatternScan {
    pub present: bool,
    pub confidence: f32,
    pub evidence: Vec<String>,
    pub matched_rules: Vec<&'static str>,
}

/// Run the rule list over `text`, starting from `base` confidence.
///
/// Every match appends an evidence snippet and its contribution; the
/// corroboration boost and hedging penalty each apply at most once.
pub fn scan(text: &str, rules: &[PatternRule], base: f32) -> PatternScan {
    let mut result = PatternScan {
        confidence: base,
        ..Default::default()
    };

    for rule in rules {
        if let Some(m) = rule.regex.find(text) {
            result.confidence += rule.contribution;
            result.evidence.push(snippet(text, m.start(), m.end()));
            result.matched_rules.push(rule.name);
            if rule.marks_present {
                result.present = true;
            }
        }
    }

    // Adjustments only make sense once something matched; a page that
    // mentions neither the field nor any hedge stays at base.
    if !result.matched_rules.is_empty() {
        if CORROBORATING_PHRASES.is_match(text) {
            result.confidence += CORROBORATION_BOOST;
        }
        if HEDGING_PHRASES.is_match(text) {
            result.confidence -= HEDGING_PENALTY;
        }
    }

    result.confidence = result.confidence.clamp(0.0, 1.0);
    result
}

/// Cut a readable evidence snippet around a match, respecting char
/// boundaries.
fn snippet(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(SNIPPET_CONTEXT)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .take(SNIPPET_CONTEXT + 1)
        .last()
        .map(|(i, _)| end + i)
        .unwrap_or(end);
    let to = (to + 1).min(text.len());
    // Snap to char boundaries
    let mut from = from;
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = to;
    while !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> Vec<PatternRule> {
        vec![
            rule(
                "designation",
                r"(?i)\bconservation\s+area\b",
                0.55,
            ),
            rule(
                "article_4",
                r"(?i)\barticle\s+4\s+direction\b",
                0.20,
            ),
            negative_rule(
                "explicit_negative",
                r"(?i)\bnot\s+within\s+a\s+conservation\s+area\b",
                0.35,
            ),
        ]
    }

    #[test]
    fn no_match_stays_at_base() {
        let scan = scan("Nothing relevant here.", &sample_rules(), 0.0);
        assert!(!scan.present);
        assert_eq!(scan.confidence, 0.0);
        assert!(scan.evidence.is_empty());
    }

    #[test]
    fn match_adds_contribution_and_evidence() {
        let result = scan(
            "The property lies within the Riverside Conservation Area.",
            &sample_rules(),
            0.0,
        );
        assert!(result.present);
        assert!(result.confidence >= 0.55, "got {}", result.confidence);
        assert_eq!(result.evidence.len(), 1);
        assert!(result.evidence[0].contains("Conservation Area"));
    }

    #[test]
    fn corroboration_boosts_once() {
        let plain = scan(
            "The property lies within a conservation area.",
            &sample_rules(),
            0.0,
        );
        let corroborated = scan(
            "The property lies within a conservation area, entered in the register of local land charges.",
            &sample_rules(),
            0.0,
        );
        let delta = corroborated.confidence - plain.confidence;
        assert!(
            (delta - CORROBORATION_BOOST).abs() < 1e-6,
            "Expected boost {CORROBORATION_BOOST}, got {delta}"
        );
    }

    #[test]
    fn hedging_penalizes() {
        let plain = scan(
            "Within a conservation area.",
            &sample_rules(),
            0.0,
        );
        let hedged = scan(
            "Possibly within a conservation area, awaiting confirmation.",
            &sample_rules(),
            0.0,
        );
        assert!(
            hedged.confidence < plain.confidence,
            "Expected {} < {}",
            hedged.confidence,
            plain.confidence
        );
    }

    #[test]
    fn negative_rule_contributes_without_presence() {
        let result = scan(
            "The property is not within a conservation area.",
            &[negative_rule(
                "explicit_negative",
                r"(?i)\bnot\s+within\s+a\s+conservation\s+area\b",
                0.35,
            )],
            0.5,
        );
        assert!(!result.present);
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn confidence_clamped_to_unit_interval() {
        let rules = vec![
            rule("a", r"charge", 0.9),
            rule("b", r"register", 0.9),
        ];
        let result = scan(
            "A charge entered in the register of local land charges.",
            &rules,
            0.5,
        );
        assert_eq!(result.confidence, 1.0);

        let penalized = scan(
            "possibly a charge",
            &[rule("a", r"charge", 0.05)],
            0.0,
        );
        assert!(penalized.confidence >= 0.0);
    }

    #[test]
    fn snippet_handles_multibyte_text() {
        let text = "Désignation — zone de conservation area près de l'église";
        let result = scan(text, &sample_rules(), 0.0);
        assert_eq!(result.evidence.len(), 1);
    }
}
