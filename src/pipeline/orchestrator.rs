//! Case processing orchestrator.
//!
//! Single entry point that drives the full pipeline for one case:
//! documents and spatial analysis fan out concurrently, results feed the
//! scoring engine, findings and the final report are assembled, and the
//! process-wide statistics are updated.
//!
//! `process_case` never returns an error: every failure mode is captured
//! into a report envelope with `success: false`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::APP_VERSION;
use crate::models::{
    AutomationLevel, ProcessingReport, ProcessingStatus, PropertyInfo, QualityMetrics,
    SearchDocument,
};
use crate::pipeline::document::{DocumentProcessor, DocumentResult};
use crate::pipeline::extraction::types::ExtractionResult;
use crate::pipeline::findings;
use crate::pipeline::scoring::{ConfidenceScoringEngine, DocumentQuality};
use crate::pipeline::spatial::{SpatialError, SpatialOverlayEngine, SpatialOverlayResult};
use crate::stats::StatisticsRecorder;

use super::models_used;

/// Unrecoverable per-case errors. Everything else degrades in place.
#[derive(Error, Debug)]
enum CaseError {
    #[error("Nothing to process: no documents and no property identifiers supplied")]
    EmptyCase,
}

/// Top-level use case: processes one property search matter.
pub struct CaseProcessor {
    documents: Arc<DocumentProcessor>,
    spatial: Arc<SpatialOverlayEngine>,
    scoring: ConfidenceScoringEngine,
    stats: Arc<StatisticsRecorder>,
}

impl CaseProcessor {
    pub fn new(
        documents: Arc<DocumentProcessor>,
        spatial: Arc<SpatialOverlayEngine>,
        scoring: ConfidenceScoringEngine,
        stats: Arc<StatisticsRecorder>,
    ) -> Self {
        Self {
            documents,
            spatial,
            scoring,
            stats,
        }
    }

    /// Process one case end to end. Never raises: failures produce a
    /// `success:false` report with manual review forced.
    pub async fn process_case(
        &self,
        matter_id: &str,
        documents: Vec<SearchDocument>,
        property: &PropertyInfo,
    ) -> ProcessingReport {
        let job_id = Uuid::new_v4();
        let started = Instant::now();

        tracing::info!(matter_id, %job_id, documents = documents.len(), "Processing case");

        match self.run_case(matter_id, job_id, documents, property, started).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(matter_id, %job_id, error = %e, "Case failed");
                self.stats.record_error(started.elapsed());
                failure_report(matter_id, job_id, e.to_string(), started.elapsed().as_secs_f64())
            }
        }
    }

    async fn run_case(
        &self,
        matter_id: &str,
        job_id: Uuid,
        documents: Vec<SearchDocument>,
        property: &PropertyInfo,
        started: Instant,
    ) -> Result<ProcessingReport, CaseError> {
        if documents.is_empty() && property.is_empty() {
            return Err(CaseError::EmptyCase);
        }

        // Fan out: one task per document, spatial analysis alongside.
        // Results correlate back by index; completion order is irrelevant.
        let filenames: Vec<String> = documents.iter().map(|d| d.filename.clone()).collect();
        let doc_tasks = documents.into_iter().map(|doc| {
            let processor = self.documents.clone();
            tokio::spawn(async move { processor.process(&doc).await })
        });
        let spatial_future = self.spatial.analyze(property);

        let (doc_joined, spatial_result) = tokio::join!(join_all(doc_tasks), spatial_future);

        let doc_results: Vec<DocumentResult> = doc_joined
            .into_iter()
            .zip(&filenames)
            .map(|(joined, filename)| {
                joined.unwrap_or_else(|e| {
                    // A panicked document task degrades to an error entry.
                    tracing::warn!(filename = %filename, error = %e, "Document task panicked");
                    DocumentResult {
                        filename: filename.clone(),
                        doc_type: crate::models::DocumentType::Llc1,
                        fields: BTreeMap::new(),
                        pages: Vec::new(),
                        text_quality: 0.0,
                        success: false,
                        error: Some(format!("processing task failed: {e}")),
                    }
                })
            })
            .collect();

        let spatial_result = match spatial_result {
            Ok(result) => Some(result),
            Err(SpatialError::Geocoding(reason)) => {
                tracing::warn!(matter_id, reason, "Geocoding failed, substituting fallback responses");
                None
            }
            Err(e) => {
                tracing::warn!(matter_id, error = %e, "Spatial analysis failed, substituting fallback responses");
                None
            }
        };

        let merged = merge_documents(&doc_results);
        let quality = document_quality(&doc_results);

        let metrics = self
            .scoring
            .score(&merged, spatial_result.as_ref(), Some(&quality));
        let structured_findings = findings::derive(&merged, spatial_result.as_ref(), &metrics);
        let automated_responses = findings::automated_responses(&structured_findings);
        let automation_level = AutomationLevel::from_confidence(metrics.overall_confidence);

        let elapsed = started.elapsed();
        self.stats.record_case(&metrics, elapsed);

        tracing::info!(
            matter_id,
            %job_id,
            overall = metrics.overall_confidence,
            automation_level = automation_level.as_str(),
            manual_review = metrics.manual_review_required,
            elapsed_ms = elapsed.as_millis() as u64,
            "Case processed"
        );

        Ok(ProcessingReport {
            matter_id: matter_id.to_string(),
            job_id,
            success: true,
            processing_status: ProcessingStatus::Completed,
            automation_level,
            error: None,
            quality_metrics: metrics,
            structured_findings,
            document_processing: documents_json(&doc_results),
            spatial_analysis: spatial_json(spatial_result.as_ref()),
            automated_responses,
            processing_metadata: crate::models::report::ProcessingMetadata {
                processed_at: Utc::now(),
                processing_version: APP_VERSION.to_string(),
                models_used: models_used(),
                processing_time_seconds: elapsed.as_secs_f64(),
            },
        })
    }
}

/// Best extraction per field across all documents, highest confidence
/// winning — the same policy the document processor applies across pages.
fn merge_documents(results: &[DocumentResult]) -> BTreeMap<String, ExtractionResult> {
    let mut merged: BTreeMap<String, ExtractionResult> = BTreeMap::new();
    for result in results.iter().filter(|r| r.success) {
        for (field, extraction) in &result.fields {
            match merged.get(field) {
                Some(existing) if existing.confidence >= extraction.confidence => {}
                _ => {
                    merged.insert(field.clone(), extraction.clone());
                }
            }
        }
    }
    merged
}

/// Document-quality signals for the scoring engine, averaged over the
/// documents that actually processed.
fn document_quality(results: &[DocumentResult]) -> DocumentQuality {
    let processed: Vec<&DocumentResult> = results.iter().filter(|r| r.success).collect();
    if processed.is_empty() {
        return DocumentQuality::default();
    }
    let mean_quality =
        processed.iter().map(|r| r.text_quality).sum::<f32>() / processed.len() as f32;
    let completeness = processed.len() as f32 / results.len().max(1) as f32;

    DocumentQuality {
        ocr_quality: Some(mean_quality),
        image_quality: Some(mean_quality),
        layout_quality: Some(mean_quality),
        text_completeness: Some(completeness),
    }
}

fn documents_json(results: &[DocumentResult]) -> Value {
    let entries: Vec<Value> = results
        .iter()
        .map(|r| {
            json!({
                "filename": r.filename,
                "documentType": r.doc_type.as_str(),
                "success": r.success,
                "error": r.error,
                "textQuality": r.text_quality,
                "pagesProcessed": r.pages.len(),
                "fields": r.fields,
            })
        })
        .collect();
    Value::Array(entries)
}

fn spatial_json(result: Option<&SpatialOverlayResult>) -> Value {
    match result {
        Some(result) => serde_json::to_value(result).unwrap_or(Value::Null),
        None => Value::Null,
    }
}

/// The failure envelope: nothing certified, everything to a human.
fn failure_report(
    matter_id: &str,
    job_id: Uuid,
    error: String,
    elapsed_seconds: f64,
) -> ProcessingReport {
    ProcessingReport {
        matter_id: matter_id.to_string(),
        job_id,
        success: false,
        processing_status: ProcessingStatus::Failed,
        automation_level: AutomationLevel::ManualProcessingRequired,
        error: Some(error),
        quality_metrics: QualityMetrics::failed(),
        structured_findings: BTreeMap::new(),
        document_processing: Value::Null,
        spatial_analysis: Value::Null,
        automated_responses: BTreeMap::new(),
        processing_metadata: crate::models::report::ProcessingMetadata {
            processed_at: Utc::now(),
            processing_version: APP_VERSION.to_string(),
            models_used: models_used(),
            processing_time_seconds: elapsed_seconds,
        },
    }
}
