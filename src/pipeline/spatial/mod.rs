//! Spatial analysis: geocoding fallback chain + concurrent overlay and
//! buffer queries against external spatial datasets.

pub mod geocoding;
pub mod overlay;
pub mod providers;
pub mod types;

use thiserror::Error;

pub use geocoding::GeocodingChain;
pub use overlay::SpatialOverlayEngine;
pub use types::{
    BufferFeature, GeocodeSource, LayerCheck, PropertyPoint, ResolvedLocation,
    SpatialOverlayResult,
};

#[derive(Error, Debug)]
pub enum SpatialError {
    /// No supplied identifier resolved to a coordinate. Fatal for spatial
    /// analysis; the orchestrator substitutes the fallback response set.
    #[error("No property identifier could be geocoded: {0}")]
    Geocoding(String),

    #[error("Provider '{provider}' query failed: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Query timed out after {0:?}")]
    Timeout(std::time::Duration),
}
