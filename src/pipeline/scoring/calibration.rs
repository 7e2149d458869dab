//! Historical accuracy calibration.
//!
//! Each field's raw extraction confidence is scaled by how accurate that
//! field's extractions have historically been. Fields without history get
//! a conservative default factor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Calibration factor for fields with no recorded history.
pub const DEFAULT_ACCURACY: f32 = 0.80;

/// Persisted accuracy record for one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAccuracy {
    pub total: u64,
    pub correct: u64,
    pub accuracy: f32,
}

/// Historical accuracy store, loaded once at startup.
pub trait AccuracyStore: Send + Sync {
    fn get(&self, field: &str) -> Option<FieldAccuracy>;
}

/// In-memory store over a preloaded accuracy map.
#[derive(Debug, Default)]
pub struct InMemoryAccuracyStore {
    records: BTreeMap<String, FieldAccuracy>,
}

impl InMemoryAccuracyStore {
    pub fn new(records: BTreeMap<String, FieldAccuracy>) -> Self {
        Self { records }
    }

    /// Empty store: every field calibrates at the default factor.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl AccuracyStore for InMemoryAccuracyStore {
    fn get(&self, field: &str) -> Option<FieldAccuracy> {
        self.records.get(field).cloned()
    }
}

/// The calibration factor applied to a field's raw confidence.
pub fn calibration_factor(store: &dyn AccuracyStore, field: &str) -> f32 {
    store
        .get(field)
        .map(|record| record.accuracy.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_ACCURACY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_uses_default() {
        let store = InMemoryAccuracyStore::empty();
        assert_eq!(calibration_factor(&store, "flood_zone"), DEFAULT_ACCURACY);
    }

    #[test]
    fn recorded_accuracy_wins() {
        let mut records = BTreeMap::new();
        records.insert(
            "flood_zone".to_string(),
            FieldAccuracy {
                total: 200,
                correct: 190,
                accuracy: 0.95,
            },
        );
        let store = InMemoryAccuracyStore::new(records);
        assert_eq!(calibration_factor(&store, "flood_zone"), 0.95);
        assert_eq!(calibration_factor(&store, "listed_building"), DEFAULT_ACCURACY);
    }

    #[test]
    fn out_of_range_accuracy_clamped() {
        let mut records = BTreeMap::new();
        records.insert(
            "bad".to_string(),
            FieldAccuracy {
                total: 1,
                correct: 2,
                accuracy: 2.0,
            },
        );
        let store = InMemoryAccuracyStore::new(records);
        assert_eq!(calibration_factor(&store, "bad"), 1.0);
    }
}
