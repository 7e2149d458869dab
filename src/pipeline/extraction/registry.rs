//! The `FieldExtractor` trait and the startup registry.
//!
//! The document processor never names concrete extractors; it asks the
//! registry for everything applicable to a document type and runs the lot.

use crate::models::DocumentType;

use super::fields;
use super::types::{ExtractionResult, LayoutData, PageText};
use super::ExtractionError;

/// One semantic field's extraction logic. Implementations are pure
/// CPU-bound analysis: no IO, no suspension points.
pub trait FieldExtractor: Send + Sync {
    /// Canonical field name, matching the scoring engine's weight table.
    fn field(&self) -> &'static str;

    /// Whether this field is expected in the given document type.
    fn applies_to(&self, doc_type: DocumentType) -> bool;

    /// Extract the field from one page. `image` is the rendered page for
    /// extractors that consult visual evidence; pattern-based extractors
    /// ignore it. Returns Err only for malformed input; the caller
    /// degrades that to a zero-confidence result.
    fn extract(
        &self,
        page: &PageText,
        layout: &LayoutData,
        image: Option<&[u8]>,
    ) -> Result<ExtractionResult, ExtractionError>;
}

/// Registry of every known field extractor, populated once at startup.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn FieldExtractor>>,
}

impl ExtractorRegistry {
    pub fn new(extractors: Vec<Box<dyn FieldExtractor>>) -> Self {
        Self { extractors }
    }

    /// The standard extractor set for LLC1/CON29 search documents.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(fields::conservation_area::ConservationAreaExtractor),
            Box::new(fields::listed_building::ListedBuildingExtractor),
            Box::new(fields::flood_zone::FloodZoneExtractor),
            Box::new(fields::planning_applications::PlanningApplicationsExtractor),
            Box::new(fields::tree_preservation::TreePreservationExtractor),
            Box::new(fields::enforcement_notices::EnforcementNoticesExtractor),
            Box::new(fields::contaminated_land::ContaminatedLandExtractor),
            Box::new(fields::highway_adoption::HighwayAdoptionExtractor),
        ])
    }

    /// Extractors applicable to the given document type.
    pub fn applicable(&self, doc_type: DocumentType) -> Vec<&dyn FieldExtractor> {
        self.extractors
            .iter()
            .filter(|e| e.applies_to(doc_type))
            .map(|e| e.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify the trait is object-safe (used as `dyn FieldExtractor`)
    #[test]
    fn trait_is_object_safe() {
        fn _assert(_: &dyn FieldExtractor) {}
    }

    #[test]
    fn standard_registry_is_populated() {
        let registry = ExtractorRegistry::standard();
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn applicable_filters_by_document_type() {
        let registry = ExtractorRegistry::standard();
        let llc1 = registry.applicable(DocumentType::Llc1);
        let con29 = registry.applicable(DocumentType::Con29);
        assert!(!llc1.is_empty());
        assert!(!con29.is_empty());

        // Planning history is a CON29 enquiry, never an LLC1 charge.
        assert!(llc1.iter().all(|e| e.field() != "planning_applications"));
        assert!(con29.iter().any(|e| e.field() == "planning_applications"));
    }

    #[test]
    fn field_names_are_unique() {
        let registry = ExtractorRegistry::standard();
        let mut names: Vec<&str> = registry.extractors.iter().map(|e| e.field()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
