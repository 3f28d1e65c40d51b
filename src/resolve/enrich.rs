//! The tiered enrichment pass.
//!
//! Prefer the most specific available key: postcode when present, otherwise
//! city, recovering a postcode from the city when possible. The city
//! centroid found in the second branch anchors the postcode disambiguation;
//! without it the choice among candidates degrades to index order.

use tracing::debug;

use crate::index::IndexError;
use crate::models::{GeoAccuracy, GeoEnrichedAddress, NormalizedAddress};

use super::OfflineGeoResolver;

impl OfflineGeoResolver {
    /// Run one resolution pass over a normalized record.
    pub fn enrich(&self, addr: NormalizedAddress) -> Result<GeoEnrichedAddress, IndexError> {
        let mut rec = GeoEnrichedAddress::new(addr);
        self.enrich_record(&mut rec)?;
        Ok(rec)
    }

    /// In-place variant. The accuracy tier never goes down: lookups that
    /// miss, or records missing the needed inputs, leave the record as-is.
    pub fn enrich_record(&self, rec: &mut GeoEnrichedAddress) -> Result<(), IndexError> {
        let country = rec.address.country_code.trim().to_string();
        let postcode = rec.address.postcode.trim().to_string();
        let city = rec.address.city.trim().to_string();

        if !country.is_empty() && !postcode.is_empty() {
            if let Some(hit) = self.by_postcode(&country, &postcode)? {
                if let Some((lat, lon)) = hit.centroid() {
                    rec.upgrade(lat, lon, GeoAccuracy::Postcode);
                    rec.geonames_match = format!("{} {}", hit.name, postcode).trim().to_string();
                    debug!(country, postcode, "enriched via postcode-exact");
                }
            }
        } else if postcode.is_empty() && !country.is_empty() && !city.is_empty() {
            let mut city_centroid = None;

            if let Some(hit) = self.by_city_best(&country, &city)? {
                if let Some((lat, lon)) = hit.centroid() {
                    rec.upgrade(lat, lon, GeoAccuracy::City);
                    rec.geonames_match = hit.name.clone();
                    city_centroid = Some((lat, lon));
                    debug!(country, city, "enriched via city-best");
                }
            }

            if let Some(hit) = self.postcode_for_city(&country, &city, city_centroid)? {
                rec.address.postcode = hit.postcode.clone();
                rec.geonames_match = format!("{} {}", hit.name, hit.postcode).trim().to_string();
                if !rec.has_coordinates() {
                    if let Some((lat, lon)) = hit.centroid() {
                        rec.upgrade(lat, lon, GeoAccuracy::Postcode);
                    }
                }
                debug!(country, city, postcode = %rec.address.postcode, "recovered postcode for city");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::index::MemoryIndex;
    use crate::models::PlaceRecord;

    use super::*;

    fn place(name: &str, postcode: &str, lat: &str, lon: &str) -> PlaceRecord {
        PlaceRecord {
            name: name.into(),
            postcode: postcode.into(),
            latitude: lat.into(),
            longitude: lon.into(),
            ..Default::default()
        }
    }

    fn addr(country: &str, postcode: &str, city: &str) -> NormalizedAddress {
        NormalizedAddress {
            country_code: country.into(),
            postcode: postcode.into(),
            city: city.into(),
            raw_address: "test".into(),
            ..Default::default()
        }
    }

    fn resolver(index: MemoryIndex) -> OfflineGeoResolver {
        OfflineGeoResolver::new(Arc::new(index), 10)
    }

    #[test]
    fn test_postcode_exact_scenario() {
        let mut index = MemoryIndex::new();
        index.put_postcode("CH#8001", place("Zürich", "8001", "47.37", "8.54"));

        let rec = resolver(index).enrich(addr("CH", "8001", "")).unwrap();

        assert_eq!(rec.geo_accuracy, GeoAccuracy::Postcode);
        assert_eq!(rec.latitude, Some(47.37));
        assert_eq!(rec.longitude, Some(8.54));
        assert_eq!(rec.geonames_match, "Zürich 8001");
    }

    #[test]
    fn test_city_recovers_postcode() {
        let mut index = MemoryIndex::new();
        index.put_city("FR#lyon", place("Lyon", "", "45.76", "4.84"));
        // 69001 is ~2 km from the city centroid, 69290 much farther.
        index.put_city_postcode("FR#lyon", place("Lyon", "69001", "45.77", "4.83"));
        index.put_city_postcode("FR#lyon", place("Lyon", "69290", "45.74", "4.63"));

        let rec = resolver(index).enrich(addr("FR", "", "Lyon")).unwrap();

        assert_eq!(rec.address.postcode, "69001");
        assert_eq!(rec.geo_accuracy, GeoAccuracy::City);
        assert_eq!(rec.latitude, Some(45.76));
        assert_eq!(rec.geonames_match, "Lyon 69001");
    }

    #[test]
    fn test_city_without_centroid_adopts_postcode_centroid() {
        let mut index = MemoryIndex::new();
        // City row exists but its coordinates never made it into the import.
        index.put_city("FR#lyon", place("Lyon", "", "", ""));
        index.put_city_postcode("FR#lyon", place("Lyon", "69001", "45.77", "4.83"));

        let rec = resolver(index).enrich(addr("FR", "", "Lyon")).unwrap();

        assert_eq!(rec.address.postcode, "69001");
        assert_eq!(rec.geo_accuracy, GeoAccuracy::Postcode);
        assert_eq!(rec.latitude, Some(45.77));
    }

    #[test]
    fn test_postcode_takes_priority_over_city() {
        let mut index = MemoryIndex::new();
        index.put_postcode("CH#8001", place("Zürich", "8001", "47.37", "8.54"));
        index.put_city("CH#zurich", place("Zürich", "", "47.0", "8.0"));

        let rec = resolver(index).enrich(addr("CH", "8001", "Zürich")).unwrap();

        assert_eq!(rec.geo_accuracy, GeoAccuracy::Postcode);
        assert_eq!(rec.latitude, Some(47.37));
    }

    #[test]
    fn test_missing_inputs_are_a_no_op() {
        let r = resolver(MemoryIndex::new());
        for a in [addr("", "8001", ""), addr("CH", "", ""), addr("", "", "Lyon")] {
            let rec = r.enrich(a).unwrap();
            assert_eq!(rec.geo_accuracy, GeoAccuracy::None);
            assert!(!rec.has_coordinates());
            assert_eq!(rec.geonames_match, "");
        }
    }

    #[test]
    fn test_postcode_miss_does_not_fall_back_to_city() {
        let mut index = MemoryIndex::new();
        // Only a city row: a record that still carries a postcode must not
        // silently resolve through the city branch.
        index.put_city("CH#zurich", place("Zürich", "", "47.37", "8.54"));

        let rec = resolver(index).enrich(addr("CH", "9999", "Zürich")).unwrap();
        assert_eq!(rec.geo_accuracy, GeoAccuracy::None);
    }

    #[test]
    fn test_enrich_never_downgrades() {
        let mut index = MemoryIndex::new();
        index.put_city("CH#zurich", place("Zürich", "", "47.0", "8.0"));

        let mut rec = GeoEnrichedAddress::new(addr("CH", "", "Zürich"));
        rec.upgrade(47.37, 8.54, GeoAccuracy::Street);
        let before = rec.geo_accuracy;

        resolver(index).enrich_record(&mut rec).unwrap();
        assert!(rec.geo_accuracy >= before);
        assert_eq!(rec.latitude, Some(47.37));
    }
}
