//! Great-circle distance, used to break ties between postcode candidates.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two WGS84 points.
///
/// Non-finite inputs are not rejected: NaN propagates through the formula
/// and comes back as NaN. Callers that rank by distance must treat NaN as
/// non-improving.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert!(distance_km(47.37, 8.54, 47.37, 8.54) < 1e-9);
    }

    #[test]
    fn test_zurich_to_bern() {
        // Zürich (47.3769, 8.5417) to Bern (46.9480, 7.4474) is ~95 km.
        let d = distance_km(47.3769, 8.5417, 46.9480, 7.4474);
        assert!((d - 95.0).abs() < 3.0, "got {d}");
    }

    #[test]
    fn test_antipodal_half_circumference() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }
}
