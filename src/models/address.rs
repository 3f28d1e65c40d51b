//! Canonical address records shared by every pipeline.

use serde::{Deserialize, Serialize};

/// Coarseness of a resolved coordinate, least to most precise.
///
/// The derived ordering is load-bearing: enrichment only ever moves a record
/// to a strictly higher tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoAccuracy {
    #[default]
    None,
    City,
    Postcode,
    Street,
}

impl std::fmt::Display for GeoAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoAccuracy::None => write!(f, "none"),
            GeoAccuracy::City => write!(f, "city"),
            GeoAccuracy::Postcode => write!(f, "postcode"),
            GeoAccuracy::Street => write!(f, "street"),
        }
    }
}

impl GeoAccuracy {
    /// Parse a provider-supplied accuracy label. Unknown labels map to `None`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "city" => GeoAccuracy::City,
            "postcode" => GeoAccuracy::Postcode,
            "street" => GeoAccuracy::Street,
            _ => GeoAccuracy::None,
        }
    }
}

/// One provider's output coerced into the canonical component schema.
///
/// Every string field is present (empty rather than null). `raw_address` is
/// the verbatim input text and is never normalized. `confidence` is always
/// within `[0, 1]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedAddress {
    /// ISO-2 country code, uppercase; may be empty when unknown.
    pub country_code: String,
    pub address_line1: String,
    pub address_line2: String,
    pub postcode: String,
    pub city: String,
    pub state_region: String,
    pub neighborhood: String,
    pub po_box: String,
    pub company: String,
    pub attention: String,
    /// Original input, preserved verbatim.
    pub raw_address: String,
    pub confidence: f64,
    pub warnings: Vec<String>,
}

/// A normalized address plus the best coordinate the offline data could
/// materialize for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoEnrichedAddress {
    #[serde(flatten)]
    pub address: NormalizedAddress,

    /// Present together with `longitude` or not at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    pub geo_accuracy: GeoAccuracy,

    /// Free-text provenance of the offline match, e.g. `"Zürich 8001"`.
    pub geonames_match: String,
}

impl GeoEnrichedAddress {
    /// Wrap a normalized record with no coordinate yet.
    pub fn new(address: NormalizedAddress) -> Self {
        Self {
            address,
            latitude: None,
            longitude: None,
            geo_accuracy: GeoAccuracy::None,
            geonames_match: String::new(),
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Adopt a coordinate at the given tier, but only if that is an upgrade
    /// over the current one.
    pub fn upgrade(&mut self, lat: f64, lon: f64, accuracy: GeoAccuracy) {
        if accuracy > self.geo_accuracy {
            self.latitude = Some(lat);
            self.longitude = Some(lon);
            self.geo_accuracy = accuracy;
        }
    }
}
