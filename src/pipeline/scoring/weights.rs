//! The fixed field-weight table behind overall confidence.
//!
//! Weights sum to 1.0 across the 11 known fields. Fields outside the
//! table get a small default weight so an unknown field still contributes
//! without being able to dominate the aggregate.

/// Weight applied to any field absent from the table.
pub const DEFAULT_FIELD_WEIGHT: f32 = 0.02;

/// field name → weight. Invariant: the weights sum to 1.0.
pub const FIELD_WEIGHTS: [(&str, f32); 11] = [
    ("conservation_area", 0.15),
    ("listed_building", 0.15),
    ("flood_zone", 0.15),
    ("enforcement_notices", 0.12),
    ("planning_applications", 0.10),
    ("tree_preservation_order", 0.08),
    ("contaminated_land", 0.08),
    ("highway_adoption", 0.05),
    ("local_land_charges", 0.05),
    ("building_regulations", 0.04),
    ("drainage_agreements", 0.03),
];

/// Fields whose low confidence alone forces manual review.
pub const CRITICAL_FIELDS: [&str; 4] = [
    "conservation_area",
    "listed_building",
    "flood_zone",
    "enforcement_notices",
];

/// Weight for a field, falling back to the default for unknown fields.
pub fn field_weight(field: &str) -> f32 {
    FIELD_WEIGHTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, w)| *w)
        .unwrap_or(DEFAULT_FIELD_WEIGHT)
}
