//! Offline place reference rows.

use serde::{Deserialize, Serialize};

/// One row of the offline place database.
///
/// Rows are produced by out-of-scope import tooling and are read-only at
/// request time. City rows carry a population for ranking and an empty
/// postcode; postcode rows carry the postcode and a zero population.
/// Coordinates are stored as decimal text, exactly as imported, and parsed
/// on read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(default)]
    pub country_code: String,

    /// Display name of the place (not the normalized key).
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub postcode: String,

    /// Used only for ranking city candidates.
    #[serde(default)]
    pub population: i64,

    #[serde(default)]
    pub latitude: String,

    #[serde(default)]
    pub longitude: String,

    /// Opaque admin metadata, passed through for provenance only.
    #[serde(default)]
    pub admin1_name: String,

    #[serde(default)]
    pub admin1_code: String,
}

impl PlaceRecord {
    /// Parse the stored centroid. `None` when either coordinate is missing,
    /// unparseable, or non-finite.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let lat: f64 = self.latitude.trim().parse().ok()?;
        let lon: f64 = self.longitude.trim().parse().ok()?;
        if lat.is_finite() && lon.is_finite() {
            Some((lat, lon))
        } else {
            None
        }
    }
}
