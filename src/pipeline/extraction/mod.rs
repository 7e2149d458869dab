//! Field extraction framework.
//!
//! One `FieldExtractor` per semantic field (conservation area status,
//! planning applications, flood zone, ...). Extractors are pure pattern +
//! layout analysis over a single page; the document processor selects the
//! applicable set per document type and merges page results.

pub mod fields;
pub mod registry;
pub mod rules;
pub mod types;

use thiserror::Error;

pub use registry::{ExtractorRegistry, FieldExtractor};
pub use types::{ExtractionMethod, ExtractionResult, FieldValue, FloodRiskTier};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Malformed page input: {0}")]
    MalformedInput(String),

    #[error("Layout data unavailable: {0}")]
    LayoutUnavailable(String),

    #[error("Pattern engine error: {0}")]
    Pattern(String),
}
