//! Output types for a processed case: the quality metrics computed by the
//! scoring engine and the final report returned to the caller.
//!
//! Everything here is JSON-serializable in camelCase — this is the wire
//! shape consumed by the report service downstream.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Five-way classification of how automated a case's processing was.
/// Derived purely from overall confidence; reporting only, never used
/// for the manual-review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationLevel {
    FullyAutomated,
    HighlyAutomated,
    PartiallyAutomated,
    AssistedProcessing,
    ManualProcessingRequired,
}

impl AutomationLevel {
    /// Classify from overall confidence. Boundaries are inclusive on the
    /// upper tier: exactly 0.95 is fully automated, exactly 0.85 highly.
    pub fn from_confidence(overall: f32) -> Self {
        if overall >= 0.95 {
            Self::FullyAutomated
        } else if overall >= 0.85 {
            Self::HighlyAutomated
        } else if overall >= 0.70 {
            Self::PartiallyAutomated
        } else if overall >= 0.50 {
            Self::AssistedProcessing
        } else {
            Self::ManualProcessingRequired
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullyAutomated => "fully_automated",
            Self::HighlyAutomated => "highly_automated",
            Self::PartiallyAutomated => "partially_automated",
            Self::AssistedProcessing => "assisted_processing",
            Self::ManualProcessingRequired => "manual_processing_required",
        }
    }
}

/// Terminal processing status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Completed,
    Failed,
}

/// Quality metrics for one case, derived fresh by the scoring engine and
/// never mutated afterwards.
///
/// All float fields are in [0,1] except `automation_rate`, which only ever
/// takes one of the discrete values {0.98, 0.92, 0.75, 0.0}.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub overall_confidence: f32,
    pub field_confidences: BTreeMap<String, f32>,
    pub processing_quality: f32,
    pub data_completeness: f32,
    pub cross_validation_score: f32,
    pub manual_review_required: bool,
    pub automation_rate: f32,
}

/// One structured legal finding, e.g. "conservation area: present,
/// confidence 0.91, sources [document_extraction, spatial_overlay]".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredFinding {
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub confidence: f32,
    pub sources: Vec<String>,
    /// Human-readable response text for the report. Populated with the
    /// fixed fallback wording when spatial analysis was unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Metadata block attached to every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetadata {
    pub processed_at: DateTime<Utc>,
    pub processing_version: String,
    pub models_used: Vec<String>,
    pub processing_time_seconds: f64,
}

/// The final report for one case. Created once, immutable, returned to the
/// caller. `success:false` reports carry the failure envelope: error text,
/// zero automation rate, manual review forced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReport {
    pub matter_id: String,
    pub job_id: Uuid,
    pub success: bool,
    pub processing_status: ProcessingStatus,
    pub automation_level: AutomationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub quality_metrics: QualityMetrics,
    pub structured_findings: BTreeMap<String, StructuredFinding>,
    /// Raw per-document extraction payloads, keyed by filename.
    pub document_processing: Value,
    /// Raw spatial overlay payload, or null when spatial analysis failed.
    pub spatial_analysis: Value,
    /// Pre-drafted response text per finding category.
    pub automated_responses: BTreeMap<String, String>,
    pub processing_metadata: ProcessingMetadata,
}

impl QualityMetrics {
    /// The degraded metrics attached to a failed case: nothing certified,
    /// everything routed to a human.
    pub fn failed() -> Self {
        Self {
            overall_confidence: 0.0,
            field_confidences: BTreeMap::new(),
            processing_quality: 0.0,
            data_completeness: 0.0,
            cross_validation_score: 0.0,
            manual_review_required: true,
            automation_rate: 0.0,
        }
    }
}
