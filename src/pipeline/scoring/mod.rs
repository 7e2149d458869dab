//! Confidence scoring: fuses extraction, spatial, and document-quality
//! signals into per-field and overall confidence, and decides automation
//! eligibility.

pub mod calibration;
pub mod engine;
pub mod weights;

pub use calibration::{AccuracyStore, FieldAccuracy, InMemoryAccuracyStore};
pub use engine::{ConfidenceScoringEngine, DocumentQuality};
