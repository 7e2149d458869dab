//! Per-document processing: run every applicable field extractor over the
//! first pages of a document and merge page results.
//!
//! Failure discipline: a failed page is recorded and skipped, a failed
//! extractor degrades to a zero-confidence result. `process` itself never
//! fails — a document that cannot be opened at all produces a result
//! envelope with `success: false`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::models::SearchDocument;
use crate::pipeline::extraction::types::ExtractionResult;
use crate::pipeline::extraction::ExtractorRegistry;

use super::layout::PageAnalyzer;

/// Result of processing one page.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub page_number: usize,
    pub fields: BTreeMap<String, ExtractionResult>,
    /// Mean of OCR quality, layout quality, and extractor success ratio.
    pub quality: f32,
    pub error: Option<String>,
}

/// Merged result of processing one document.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub filename: String,
    pub doc_type: crate::models::DocumentType,
    /// Best extraction per field across all pages.
    pub fields: BTreeMap<String, ExtractionResult>,
    pub pages: Vec<PageResult>,
    /// Mean page quality; consumed by the scoring engine as OCR/text
    /// quality for this document.
    pub text_quality: f32,
    pub success: bool,
    pub error: Option<String>,
}

impl DocumentResult {
    fn failed(doc: &SearchDocument, error: String) -> Self {
        Self {
            filename: doc.filename.clone(),
            doc_type: doc.doc_type,
            fields: BTreeMap::new(),
            pages: Vec::new(),
            text_quality: 0.0,
            success: false,
            error: Some(error),
        }
    }
}

/// Runs the registered field extractors over every page of one document.
pub struct DocumentProcessor {
    registry: Arc<ExtractorRegistry>,
    analyzer: Arc<dyn PageAnalyzer>,
    config: EngineConfig,
}

impl DocumentProcessor {
    pub fn new(
        registry: Arc<ExtractorRegistry>,
        analyzer: Arc<dyn PageAnalyzer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            analyzer,
            config,
        }
    }

    /// Process one document. Page-level failures are caught and recorded
    /// per page; they never abort the remaining pages.
    pub async fn process(&self, doc: &SearchDocument) -> DocumentResult {
        let page_count = match tokio::time::timeout(
            self.config.provider_timeout,
            self.analyzer.page_count(doc),
        )
        .await
        {
            Ok(Ok(n)) => n.min(self.config.max_pages_per_document),
            Ok(Err(e)) => {
                tracing::warn!(filename = %doc.filename, error = %e, "Document unreadable");
                return DocumentResult::failed(doc, e.to_string());
            }
            Err(_) => {
                tracing::warn!(filename = %doc.filename, "Page count timed out");
                return DocumentResult::failed(doc, "page analysis timed out".into());
            }
        };

        let extractors = self.registry.applicable(doc.doc_type);
        let mut pages = Vec::with_capacity(page_count);
        let mut merged: BTreeMap<String, ExtractionResult> = BTreeMap::new();

        for page_number in 0..page_count {
            let page_result = self.process_page(doc, page_number, &extractors).await;

            if page_result.error.is_none() {
                for (field, result) in &page_result.fields {
                    match merged.get(field) {
                        Some(existing) if existing.confidence >= result.confidence => {}
                        _ => {
                            merged.insert(field.clone(), result.clone());
                        }
                    }
                }
            }
            pages.push(page_result);
        }

        let analyzed: Vec<&PageResult> = pages.iter().filter(|p| p.error.is_none()).collect();
        let text_quality = if analyzed.is_empty() {
            0.0
        } else {
            analyzed.iter().map(|p| p.quality).sum::<f32>() / analyzed.len() as f32
        };
        let success = !analyzed.is_empty();

        tracing::debug!(
            filename = %doc.filename,
            pages = pages.len(),
            fields = merged.len(),
            text_quality,
            "Document processed"
        );

        DocumentResult {
            filename: doc.filename.clone(),
            doc_type: doc.doc_type,
            fields: merged,
            pages,
            text_quality,
            success,
            error: None,
        }
    }

    async fn process_page(
        &self,
        doc: &SearchDocument,
        page_number: usize,
        extractors: &[&dyn crate::pipeline::extraction::FieldExtractor],
    ) -> PageResult {
        let content = match tokio::time::timeout(
            self.config.provider_timeout,
            self.analyzer.analyze_page(doc, page_number),
        )
        .await
        {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                tracing::warn!(
                    filename = %doc.filename,
                    page = page_number,
                    error = %e,
                    "Page analysis failed"
                );
                return PageResult {
                    page_number,
                    fields: BTreeMap::new(),
                    quality: 0.0,
                    error: Some(e.to_string()),
                };
            }
            Err(_) => {
                return PageResult {
                    page_number,
                    fields: BTreeMap::new(),
                    quality: 0.0,
                    error: Some("page analysis timed out".into()),
                };
            }
        };

        let mut fields = BTreeMap::new();
        let mut succeeded = 0usize;

        for extractor in extractors {
            let result = match extractor.extract(
                &content.text,
                &content.layout,
                content.image.as_deref(),
            ) {
                Ok(result) => {
                    succeeded += 1;
                    result
                }
                Err(e) => {
                    // Extractor failure degrades to a zero-value result;
                    // it never crosses the processor boundary.
                    tracing::debug!(
                        field = extractor.field(),
                        page = page_number,
                        error = %e,
                        "Extractor degraded to absent result"
                    );
                    ExtractionResult::absent(extractor.field())
                }
            };
            fields.insert(result.field.clone(), result);
        }

        let success_ratio = if extractors.is_empty() {
            1.0
        } else {
            succeeded as f32 / extractors.len() as f32
        };
        let quality = (content.ocr_quality + content.layout_quality + success_ratio) / 3.0;

        PageResult {
            page_number,
            fields,
            quality,
            error: None,
        }
    }
}
