//! Document processing: per-page OCR/layout analysis + field extraction,
//! merged into one per-document result.

pub mod layout;
pub mod processor;

use thiserror::Error;

pub use layout::{LayoutModel, PageAnalyzer, PageContent, PlainTextAnalyzer};
pub use processor::{DocumentProcessor, DocumentResult, PageResult};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Unreadable document content: {0}")]
    UnreadableContent(String),

    #[error("Page {page} analysis failed: {reason}")]
    PageAnalysis { page: usize, reason: String },

    #[error("Layout model error: {0}")]
    LayoutModel(String),

    #[error("Page analysis timed out after {0:?}")]
    Timeout(std::time::Duration),
}
