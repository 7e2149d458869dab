//! Prioritized geocoding fallback chain.
//!
//! Evaluated in order, short-circuiting on first success:
//! 1. explicit caller-supplied coordinates, used as-is;
//! 2. UPRN lookup against the authoritative places service;
//! 3. address geocoders in priority order — exit early on any result
//!    above the configured confidence, otherwise best-of-all wins.

use std::sync::Arc;
use std::time::Duration;

use crate::models::PropertyInfo;

use super::providers::{GeocodeCandidate, GeocodingService, PlacesService};
use super::types::{GeocodeSource, PropertyPoint, ResolvedLocation};
use super::SpatialError;

pub struct GeocodingChain {
    places: Option<Arc<dyn PlacesService>>,
    geocoders: Vec<Arc<dyn GeocodingService>>,
    early_exit: f32,
    timeout: Duration,
}

impl GeocodingChain {
    pub fn new(
        places: Option<Arc<dyn PlacesService>>,
        geocoders: Vec<Arc<dyn GeocodingService>>,
        early_exit: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            places,
            geocoders,
            early_exit,
            timeout,
        }
    }

    /// Resolve a property to a point, or fail with `SpatialError::Geocoding`
    /// when nothing resolves.
    pub async fn resolve(&self, property: &PropertyInfo) -> Result<ResolvedLocation, SpatialError> {
        if let Some((easting, northing)) = property.coordinates() {
            return Ok(ResolvedLocation {
                point: PropertyPoint { easting, northing },
                confidence: 1.0,
                source: GeocodeSource::ExplicitCoordinates,
            });
        }

        if let (Some(uprn), Some(places)) = (&property.uprn, &self.places) {
            match tokio::time::timeout(self.timeout, places.lookup_uprn(uprn)).await {
                Ok(Ok(candidate)) => {
                    return Ok(ResolvedLocation {
                        point: candidate.point,
                        confidence: candidate.confidence,
                        source: GeocodeSource::UprnLookup,
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!(uprn = %uprn, error = %e, "UPRN lookup failed, falling back to address geocoding");
                }
                Err(_) => {
                    tracing::warn!(uprn = %uprn, "UPRN lookup timed out, falling back to address geocoding");
                }
            }
        }

        let Some(address) = property.address.as_deref() else {
            return Err(SpatialError::Geocoding(
                "no address to fall back to after coordinate and UPRN resolution".into(),
            ));
        };

        let mut best: Option<(GeocodeCandidate, &'static str)> = None;
        for geocoder in &self.geocoders {
            let candidate =
                match tokio::time::timeout(self.timeout, geocoder.geocode(address)).await {
                    Ok(Ok(candidate)) => candidate,
                    Ok(Err(e)) => {
                        tracing::warn!(service = geocoder.name(), error = %e, "Geocoder failed");
                        continue;
                    }
                    Err(_) => {
                        tracing::warn!(service = geocoder.name(), "Geocoder timed out");
                        continue;
                    }
                };

            let better = best
                .as_ref()
                .map(|(b, _)| candidate.confidence > b.confidence)
                .unwrap_or(true);
            if better {
                best = Some((candidate, geocoder.name()));
            }

            // Good enough — stop burning calls on lower-priority services.
            if best.as_ref().map(|(b, _)| b.confidence).unwrap_or(0.0) > self.early_exit {
                break;
            }
        }

        match best {
            Some((candidate, service)) => Ok(ResolvedLocation {
                point: candidate.point,
                confidence: candidate.confidence,
                source: GeocodeSource::AddressGeocoding(service.to_string()),
            }),
            None => Err(SpatialError::Geocoding(format!(
                "all {} geocoding services failed for address",
                self.geocoders.len()
            ))),
        }
    }
}
