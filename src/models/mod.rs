//! Case-level domain types shared across the pipeline.

pub mod document;
pub mod report;

pub use document::{DocumentType, PropertyInfo, SearchDocument};
pub use report::{
    AutomationLevel, ProcessingReport, ProcessingStatus, QualityMetrics, StructuredFinding,
};
