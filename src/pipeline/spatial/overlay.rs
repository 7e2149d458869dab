//! The spatial overlay engine: geocode once, then fan out the fixed set of
//! overlay checks and buffer analyses concurrently.
//!
//! Partial-failure isolation is the discipline here: one failed check
//! becomes a zero-confidence record with an error note and never aborts
//! its siblings.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::config::{layer_accuracy_ceiling, EngineConfig};
use crate::models::PropertyInfo;

use super::geocoding::GeocodingChain;
use super::providers::SpatialDatasetProvider;
use super::types::{BufferFeature, LayerCheck, PropertyPoint, SpatialOverlayResult};
use super::SpatialError;

/// The fixed overlay layers checked for every case.
pub const OVERLAY_LAYERS: [&str; 7] = [
    "flood_zones",
    "conservation_areas",
    "listed_buildings",
    "tree_preservation_orders",
    "contaminated_land",
    "planning_constraints",
    "highway_adoption",
];

/// The fixed buffer analyses: (analysis name, layer, radius in metres).
pub const BUFFER_ANALYSES: [(&str, &str, f64); 5] = [
    ("highways_within_20m", "highways", 20.0),
    ("public_sewers_within_3m", "public_sewers", 3.0),
    ("watercourses_within_10m", "watercourses", 10.0),
    ("listed_buildings_within_100m", "listed_buildings", 100.0),
    ("landfill_within_250m", "landfill_sites", 250.0),
];

pub struct SpatialOverlayEngine {
    geocoder: GeocodingChain,
    providers: BTreeMap<String, Arc<dyn SpatialDatasetProvider>>,
    config: EngineConfig,
}

impl SpatialOverlayEngine {
    pub fn new(
        geocoder: GeocodingChain,
        providers: Vec<Arc<dyn SpatialDatasetProvider>>,
        config: EngineConfig,
    ) -> Self {
        let providers = providers
            .into_iter()
            .map(|p| (p.layer().to_string(), p))
            .collect();
        Self {
            geocoder,
            providers,
            config,
        }
    }

    /// Full spatial analysis for one property. Fails only when geocoding
    /// fails; every downstream query degrades in place.
    pub async fn analyze(
        &self,
        property: &PropertyInfo,
    ) -> Result<SpatialOverlayResult, SpatialError> {
        let location = self.geocoder.resolve(property).await?;
        let point = location.point;

        tracing::debug!(
            easting = point.easting,
            northing = point.northing,
            source = ?location.source,
            "Property geocoded, running overlay checks"
        );

        // Overlay checks and buffer analyses all fan out together; results
        // are correlated back by index, not completion order.
        let overlay_tasks = OVERLAY_LAYERS.iter().map(|&layer| {
            let provider = self.providers.get(layer).cloned();
            let timeout = self.config.provider_timeout;
            tokio::spawn(async move { run_overlay_check(layer, provider, point, timeout).await })
        });

        let buffer_tasks = BUFFER_ANALYSES.iter().map(|&(analysis, layer, radius)| {
            let provider = self.providers.get(layer).cloned();
            let timeout = self.config.provider_timeout;
            tokio::spawn(async move {
                run_buffer_query(analysis, provider, point, radius, timeout).await
            })
        });

        let (overlay_results, buffer_results) = tokio::join!(
            join_all(overlay_tasks),
            join_all(buffer_tasks),
        );

        let mut layers = Vec::with_capacity(OVERLAY_LAYERS.len());
        let mut confidences = BTreeMap::new();
        let mut errors = BTreeMap::new();

        for (layer, joined) in OVERLAY_LAYERS.iter().zip(overlay_results) {
            // A panicking task degrades like any other failed check.
            let check = joined
                .unwrap_or_else(|e| LayerCheck::degraded(layer, format!("task panicked: {e}")));
            confidences.insert(check.layer.clone(), check.confidence);
            if let Some(error) = &check.error {
                errors.insert(check.layer.clone(), error.clone());
            }
            layers.push(check);
        }

        let mut buffers = BTreeMap::new();
        for ((analysis, _, _), joined) in BUFFER_ANALYSES.iter().zip(buffer_results) {
            let (features, confidence, error) = joined.unwrap_or_else(|e| {
                (Vec::new(), 0.0, Some(format!("task panicked: {e}")))
            });
            confidences.insert(analysis.to_string(), confidence);
            if let Some(error) = error {
                errors.insert(analysis.to_string(), error);
            }
            buffers.insert(analysis.to_string(), features);
        }

        Ok(SpatialOverlayResult {
            location,
            layers,
            buffers,
            confidences,
            errors,
        })
    }
}

async fn run_overlay_check(
    layer: &'static str,
    provider: Option<Arc<dyn SpatialDatasetProvider>>,
    point: PropertyPoint,
    timeout: std::time::Duration,
) -> LayerCheck {
    let Some(provider) = provider else {
        return LayerCheck::degraded(layer, "no dataset provider registered".into());
    };

    match tokio::time::timeout(timeout, provider.intersects(&point)).await {
        Ok(Ok(hit)) => {
            let ceiling = layer_accuracy_ceiling(layer).min(provider.nominal_accuracy());
            LayerCheck {
                layer: layer.to_string(),
                intersects: hit.intersects,
                confidence: hit.confidence.clamp(0.0, 1.0).min(ceiling),
                attributes: hit.attributes,
                error: None,
            }
        }
        Ok(Err(e)) => {
            tracing::warn!(layer, error = %e, "Overlay check failed");
            LayerCheck::degraded(layer, e.to_string())
        }
        Err(_) => {
            tracing::warn!(layer, "Overlay check timed out");
            LayerCheck::degraded(layer, format!("timed out after {timeout:?}"))
        }
    }
}

async fn run_buffer_query(
    analysis: &'static str,
    provider: Option<Arc<dyn SpatialDatasetProvider>>,
    point: PropertyPoint,
    radius_m: f64,
    timeout: std::time::Duration,
) -> (Vec<BufferFeature>, f32, Option<String>) {
    let Some(provider) = provider else {
        return (
            Vec::new(),
            0.0,
            Some("no dataset provider registered".into()),
        );
    };

    match tokio::time::timeout(timeout, provider.features_within(&point, radius_m)).await {
        Ok(Ok(features)) => (features, provider.nominal_accuracy(), None),
        Ok(Err(e)) => {
            tracing::warn!(analysis, error = %e, "Buffer query failed");
            (Vec::new(), 0.0, Some(e.to_string()))
        }
        Err(_) => (Vec::new(), 0.0, Some(format!("timed out after {timeout:?}"))),
    }
}
