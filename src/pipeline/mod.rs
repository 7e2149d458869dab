//! The case processing pipeline.
//!
//! Dependency order, leaves first: field extraction → document processing
//! → spatial overlay → confidence scoring → orchestration. Each stage
//! degrades its own failures; only the orchestrator assembles reports.

pub mod document;
pub mod extraction;
pub mod findings;
pub mod orchestrator;
pub mod scoring;
pub mod spatial;

pub use orchestrator::CaseProcessor;

/// Model/ruleset identifiers stamped into every report's metadata.
pub fn models_used() -> Vec<String> {
    vec![
        "field-pattern-rules-v2".to_string(),
        "layout-token-classifier".to_string(),
        "spatial-overlay-v1".to_string(),
    ]
}
