//! OCR/layout collaborator seams.
//!
//! The rendering + OCR + token-classification stack is a black box behind
//! `PageAnalyzer`; implementations may call a remote layout model, a local
//! ONNX session, or nothing at all. `PlainTextAnalyzer` is the in-tree
//! implementation for already-textual documents and for tests.

use async_trait::async_trait;

use crate::models::SearchDocument;
use crate::pipeline::extraction::types::{LayoutData, PageText};

use super::DocumentError;

/// Analyzed content of one page: text, token layout, and the quality
/// signals the scoring engine later consumes.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub text: PageText,
    pub layout: LayoutData,
    /// Rendered page image, when the analyzer rasterized one. Passed to
    /// extractors that consult visual evidence.
    pub image: Option<Vec<u8>>,
    /// OCR confidence for this page, 1.0-ish for digital text.
    pub ocr_quality: f32,
    /// Layout model confidence; 0.5 when no model ran.
    pub layout_quality: f32,
}

/// Token-level layout classification — black box, swappable.
pub trait LayoutModel: Send + Sync {
    fn classify(&self, text: &str) -> Result<LayoutData, DocumentError>;
}

/// Renders, OCRs, and layout-classifies document pages.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    /// Number of pages in the document.
    async fn page_count(&self, doc: &SearchDocument) -> Result<usize, DocumentError>;

    /// Analyze one page (zero-indexed).
    async fn analyze_page(
        &self,
        doc: &SearchDocument,
        page_number: usize,
    ) -> Result<PageContent, DocumentError>;
}

/// Analyzer for documents whose content is already plain UTF-8 text.
/// Pages are split on form feeds; OCR quality is fixed high since there is
/// no recognition step. An optional layout model adds token labels.
pub struct PlainTextAnalyzer {
    model: Option<Box<dyn LayoutModel>>,
}

/// Confidence assigned to digitally-read text.
const DIGITAL_TEXT_QUALITY: f32 = 0.99;

impl PlainTextAnalyzer {
    pub fn new() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: Box<dyn LayoutModel>) -> Self {
        Self { model: Some(model) }
    }

    fn pages(doc: &SearchDocument) -> Result<Vec<String>, DocumentError> {
        let text = std::str::from_utf8(&doc.content)
            .map_err(|e| DocumentError::UnreadableContent(e.to_string()))?;
        Ok(text.split('\u{c}').map(str::to_string).collect())
    }
}

impl Default for PlainTextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageAnalyzer for PlainTextAnalyzer {
    async fn page_count(&self, doc: &SearchDocument) -> Result<usize, DocumentError> {
        Ok(Self::pages(doc)?.len())
    }

    async fn analyze_page(
        &self,
        doc: &SearchDocument,
        page_number: usize,
    ) -> Result<PageContent, DocumentError> {
        let pages = Self::pages(doc)?;
        let text = pages
            .get(page_number)
            .ok_or_else(|| DocumentError::PageAnalysis {
                page: page_number,
                reason: format!("document has only {} pages", pages.len()),
            })?;

        let (layout, layout_quality) = match &self.model {
            Some(model) => {
                let layout = model.classify(text)?;
                let quality = if layout.tokens.is_empty() {
                    0.5
                } else {
                    layout.tokens.iter().map(|t| t.confidence).sum::<f32>()
                        / layout.tokens.len() as f32
                };
                (layout, quality)
            }
            None => (LayoutData::default(), 0.5),
        };

        Ok(PageContent {
            text: PageText {
                page_number,
                text: text.clone(),
            },
            layout,
            image: None,
            ocr_quality: DIGITAL_TEXT_QUALITY,
            layout_quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::pipeline::extraction::types::LayoutToken;

    fn doc(text: &str) -> SearchDocument {
        SearchDocument::new(DocumentType::Llc1, text.as_bytes().to_vec(), "test.txt")
    }

    #[tokio::test]
    async fn splits_pages_on_form_feed() {
        let analyzer = PlainTextAnalyzer::new();
        let document = doc("page one\u{c}page two\u{c}page three");
        assert_eq!(analyzer.page_count(&document).await.unwrap(), 3);

        let page = analyzer.analyze_page(&document, 1).await.unwrap();
        assert_eq!(page.text.text, "page two");
        assert_eq!(page.ocr_quality, DIGITAL_TEXT_QUALITY);
    }

    #[tokio::test]
    async fn out_of_range_page_fails() {
        let analyzer = PlainTextAnalyzer::new();
        let result = analyzer.analyze_page(&doc("only page"), 5).await;
        assert!(matches!(result, Err(DocumentError::PageAnalysis { page: 5, .. })));
    }

    #[tokio::test]
    async fn invalid_utf8_is_unreadable() {
        let analyzer = PlainTextAnalyzer::new();
        let document = SearchDocument::new(DocumentType::Con29, vec![0xff, 0xfe, 0x00], "bin.dat");
        let result = analyzer.page_count(&document).await;
        assert!(matches!(result, Err(DocumentError::UnreadableContent(_))));
    }

    struct FixedModel;

    impl LayoutModel for FixedModel {
        fn classify(&self, _text: &str) -> Result<LayoutData, DocumentError> {
            Ok(LayoutData {
                tokens: vec![LayoutToken {
                    text: "Conservation Area".into(),
                    label: "charge_type".into(),
                    confidence: 0.9,
                }],
            })
        }
    }

    #[tokio::test]
    async fn layout_model_quality_is_mean_token_confidence() {
        let analyzer = PlainTextAnalyzer::with_model(Box::new(FixedModel));
        let page = analyzer.analyze_page(&doc("text"), 0).await.unwrap();
        assert!((page.layout_quality - 0.9).abs() < 1e-6);
        assert_eq!(page.layout.tokens.len(), 1);
    }
}
