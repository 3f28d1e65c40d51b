//! In-memory place index for tests and small fixtures.
//!
//! Candidate lists are returned in insertion order, so a fixture models the
//! store's ordering contract directly: insert city rows best-populated
//! first, postcode rows in ascending postcode order.

use std::collections::{BTreeMap, HashMap};

use crate::models::PlaceRecord;

use super::{IndexError, PlaceIndex};

#[derive(Debug, Default)]
pub struct MemoryIndex {
    postcodes: HashMap<String, PlaceRecord>,
    cities: BTreeMap<String, Vec<PlaceRecord>>,
    city_postcodes: BTreeMap<String, Vec<PlaceRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_postcode(&mut self, key: &str, rec: PlaceRecord) {
        self.postcodes.insert(key.to_string(), rec);
    }

    pub fn put_city(&mut self, key: &str, rec: PlaceRecord) {
        self.cities.entry(key.to_string()).or_default().push(rec);
    }

    pub fn put_city_postcode(&mut self, key: &str, rec: PlaceRecord) {
        self.city_postcodes
            .entry(key.to_string())
            .or_default()
            .push(rec);
    }
}

impl PlaceIndex for MemoryIndex {
    fn postcode(&self, key: &str) -> Result<Option<PlaceRecord>, IndexError> {
        Ok(self.postcodes.get(key).cloned())
    }

    fn cities_by_population(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<PlaceRecord>, IndexError> {
        Ok(self
            .cities
            .get(key)
            .map(|v| v.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn postcodes_for_city(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<PlaceRecord>, IndexError> {
        Ok(self
            .city_postcodes
            .get(key)
            .map(|v| v.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_lookup_miss() {
        let index = MemoryIndex::new();
        assert!(index.postcode("CH#8001").unwrap().is_none());
    }

    #[test]
    fn test_range_limit_respected() {
        let mut index = MemoryIndex::new();
        for pc in ["69001", "69002", "69003"] {
            index.put_city_postcode(
                "FR#lyon",
                PlaceRecord {
                    postcode: pc.into(),
                    ..Default::default()
                },
            );
        }

        let rows = index.postcodes_for_city("FR#lyon", 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].postcode, "69001");
    }
}
