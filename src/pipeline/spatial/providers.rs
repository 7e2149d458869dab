//! Collaborator traits for geocoding and spatial dataset queries.
//!
//! All IO-shaped, all object-safe: the engine holds registries of boxed
//! providers and fans out over them. Concrete adapters (registry APIs,
//! tile services) live outside this crate.

use async_trait::async_trait;
use serde_json::Value;

use super::types::{BufferFeature, PropertyPoint};
use super::SpatialError;

/// A candidate location from a geocoding call.
#[derive(Debug, Clone)]
pub struct GeocodeCandidate {
    pub point: PropertyPoint,
    pub confidence: f32,
}

/// Authoritative UPRN lookup against a places service.
#[async_trait]
pub trait PlacesService: Send + Sync {
    async fn lookup_uprn(&self, uprn: &str) -> Result<GeocodeCandidate, SpatialError>;
}

/// One address geocoding service in the prioritized chain.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    fn name(&self) -> &'static str;

    async fn geocode(&self, address: &str) -> Result<GeocodeCandidate, SpatialError>;
}

/// Result of a point-in-layer query.
#[derive(Debug, Clone)]
pub struct LayerHit {
    pub intersects: bool,
    /// Raw confidence as reported by the source, before ceiling capping.
    pub confidence: f32,
    pub attributes: Value,
}

/// One spatial dataset (flood zones, listed buildings, highways, ...).
///
/// `nominal_accuracy` is the source's declared accuracy; the engine never
/// reports a higher confidence for this layer than that.
#[async_trait]
pub trait SpatialDatasetProvider: Send + Sync {
    fn layer(&self) -> &'static str;

    fn nominal_accuracy(&self) -> f32;

    async fn intersects(&self, point: &PropertyPoint) -> Result<LayerHit, SpatialError>;

    async fn features_within(
        &self,
        point: &PropertyPoint,
        radius_m: f64,
    ) -> Result<Vec<BufferFeature>, SpatialError>;
}
