//! Engine configuration.
//!
//! Everything the upstream behavior left unspecified but a deployment must
//! pin down lives here: page caps, provider timeouts, per-layer accuracy
//! ceilings. Defaults match the reference deployment.

use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Searchlight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime configuration for the processing pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pages examined per document. Search documents rarely exceed this;
    /// anything past the cap is ignored rather than processed.
    pub max_pages_per_document: usize,
    /// Timeout applied around every external provider call (geocoding,
    /// dataset queries, page analysis). No retries on expiry.
    pub provider_timeout: Duration,
    /// Address geocoding stops trying further services once a result at or
    /// above this confidence arrives.
    pub geocoder_early_exit: f32,
    /// A case summary line is logged every this-many completed cases.
    pub stats_log_interval: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_pages_per_document: 10,
            provider_timeout: Duration::from_secs(10),
            geocoder_early_exit: 0.9,
            stats_log_interval: 10,
        }
    }
}

/// Accuracy ceiling for a spatial layer: the engine never reports higher
/// confidence than the underlying data source is known to support, however
/// unambiguous the raw check was.
pub fn layer_accuracy_ceiling(layer: &str) -> f32 {
    match layer {
        "flood_zones" => 0.95,
        "listed_buildings" => 0.92,
        "conservation_areas" => 0.90,
        "highway_adoption" => 0.90,
        "contaminated_land" => 0.88,
        "tree_preservation_orders" => 0.85,
        "planning_constraints" => 0.85,
        _ => 0.80,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_cap_is_ten() {
        assert_eq!(EngineConfig::default().max_pages_per_document, 10);
    }

    #[test]
    fn ceilings_are_valid_confidences() {
        for layer in [
            "flood_zones",
            "conservation_areas",
            "listed_buildings",
            "tree_preservation_orders",
            "contaminated_land",
            "planning_constraints",
            "highway_adoption",
            "unknown_layer",
        ] {
            let ceiling = layer_accuracy_ceiling(layer);
            assert!((0.0..=1.0).contains(&ceiling), "{layer}: {ceiling}");
        }
    }

    #[test]
    fn flood_ceiling_is_highest() {
        assert!(layer_accuracy_ceiling("flood_zones") > layer_accuracy_ceiling("conservation_areas"));
    }
}
