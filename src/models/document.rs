//! Input types for a property search case: the documents supplied by the
//! local authority and the property identifiers supplied by the caller.

use serde::{Deserialize, Serialize};

/// The two standard UK local-authority search document categories.
///
/// Each carries a different set of expected legal findings: LLC1 covers
/// registered local land charges (conservation areas, listed buildings,
/// tree preservation orders), CON29 covers enquiries of the local
/// authority (planning history, enforcement, highways, drainage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Llc1,
    Con29,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llc1 => "LLC1",
            Self::Con29 => "CON29",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LLC1" => Some(Self::Llc1),
            "CON29" => Some(Self::Con29),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One search document as supplied by the caller. Immutable input,
/// consumed once by the document processor.
#[derive(Debug, Clone)]
pub struct SearchDocument {
    pub doc_type: DocumentType,
    pub content: Vec<u8>,
    pub filename: String,
}

impl SearchDocument {
    pub fn new(doc_type: DocumentType, content: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            doc_type,
            content,
            filename: filename.into(),
        }
    }
}

/// Property identifiers for geocoding. At least one of the fields must be
/// resolvable or spatial analysis fails with a geocoding error.
///
/// Easting/northing are OSGB36 (EPSG:27700) grid coordinates, the native
/// CRS of every dataset the overlay engine queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub address: Option<String>,
    pub uprn: Option<String>,
    pub easting: Option<f64>,
    pub northing: Option<f64>,
}

impl PropertyInfo {
    /// Explicit grid coordinates, if the caller supplied both halves.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.easting, self.northing) {
            (Some(e), Some(n)) => Some((e, n)),
            _ => None,
        }
    }

    /// True when no field could possibly resolve to a point.
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.uprn.is_none() && self.coordinates().is_none()
    }
}
