//! Types for spatial analysis results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point in OSGB36 (EPSG:27700) grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyPoint {
    pub easting: f64,
    pub northing: f64,
}

/// Where a resolved coordinate came from, in fallback-chain order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "service", rename_all = "snake_case")]
pub enum GeocodeSource {
    ExplicitCoordinates,
    UprnLookup,
    AddressGeocoding(String),
}

/// A geocoded property location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub point: PropertyPoint,
    pub confidence: f32,
    pub source: GeocodeSource,
}

/// Result of one overlay check against a named hazard/designation layer.
/// A failed check is a zero-confidence record with the error note, never
/// a missing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerCheck {
    pub layer: String,
    pub intersects: bool,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attributes: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayerCheck {
    pub fn degraded(layer: &str, error: String) -> Self {
        Self {
            layer: layer.to_string(),
            intersects: false,
            confidence: 0.0,
            attributes: Value::Null,
            error: Some(error),
        }
    }
}

/// One feature returned by a buffer/distance query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferFeature {
    pub name: String,
    pub feature_type: String,
    pub distance_m: f64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attributes: Value,
}

/// The full spatial analysis for one case. Produced once, read-only
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialOverlayResult {
    pub location: ResolvedLocation,
    pub layers: Vec<LayerCheck>,
    /// Named buffer analyses → nearby features, e.g.
    /// "highways_within_20m" → [...]
    pub buffers: BTreeMap<String, Vec<BufferFeature>>,
    /// Layer/analysis name → confidence after accuracy-ceiling capping.
    pub confidences: BTreeMap<String, f32>,
    /// Per-query error notes, keyed like `confidences`.
    pub errors: BTreeMap<String, String>,
}

impl SpatialOverlayResult {
    /// The overlay check for a layer, if it ran.
    pub fn layer(&self, name: &str) -> Option<&LayerCheck> {
        self.layers.iter().find(|l| l.layer == name)
    }
}
