//! Sled-backed place index.
//!
//! Three trees, one per access pattern:
//! - `postcodes`: `CC#POSTCODE` -> row (point lookup)
//! - `cities`: `CC#<name key>#<inverted zero-padded population>#<id>` -> row
//! - `city_postcodes`: `CC#<name key>#<postcode>` -> row
//!
//! Sled range scans are ascending, so the cities tree stores the population
//! sort component inverted: `scan_prefix` then yields the best-populated row
//! first. Postcode-by-city keys sort ascending by postcode as-is.
//!
//! The `insert_*` methods are the write surface the (out-of-scope) import
//! tooling calls; request-time code only sees the [`PlaceIndex`] reads.

use std::path::Path;

use crate::models::PlaceRecord;
use crate::normalize::normalize_key;

use super::{composite_key, IndexError, PlaceIndex};

/// Width of the zero-padded population sort component.
const POP_PAD: usize = 12;
const POP_MAX: i64 = 999_999_999_999;

pub struct SledIndex {
    postcodes: sled::Tree,
    cities: sled::Tree,
    city_postcodes: sled::Tree,
}

impl SledIndex {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let db = sled::open(path)?;
        Ok(Self {
            postcodes: db.open_tree("postcodes")?,
            cities: db.open_tree("cities")?,
            city_postcodes: db.open_tree("city_postcodes")?,
        })
    }

    pub fn insert_postcode(&self, rec: &PlaceRecord) -> Result<(), IndexError> {
        let key = composite_key(&rec.country_code, rec.postcode.trim());
        self.postcodes.insert(key.as_bytes(), serde_json::to_vec(rec)?)?;
        Ok(())
    }

    /// `id` uniquifies rows sharing a name key and population (e.g. the
    /// upstream gazetteer id).
    pub fn insert_city(&self, rec: &PlaceRecord, id: &str) -> Result<(), IndexError> {
        let name_key = normalize_key(&rec.name);
        let sort = POP_MAX - rec.population.clamp(0, POP_MAX);
        let key = format!(
            "{}#{:0pad$}#{}",
            composite_key(&rec.country_code, &name_key),
            sort,
            id,
            pad = POP_PAD
        );
        self.cities.insert(key.as_bytes(), serde_json::to_vec(rec)?)?;
        Ok(())
    }

    pub fn insert_city_postcode(&self, rec: &PlaceRecord) -> Result<(), IndexError> {
        let name_key = normalize_key(&rec.name);
        let key = format!(
            "{}#{}",
            composite_key(&rec.country_code, &name_key),
            rec.postcode.trim()
        );
        self.city_postcodes
            .insert(key.as_bytes(), serde_json::to_vec(rec)?)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), IndexError> {
        self.postcodes.flush()?;
        self.cities.flush()?;
        self.city_postcodes.flush()?;
        Ok(())
    }

    fn scan(tree: &sled::Tree, key: &str, limit: usize) -> Result<Vec<PlaceRecord>, IndexError> {
        let prefix = format!("{key}#");
        let mut out = Vec::new();
        for item in tree.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            out.push(serde_json::from_slice(&value)?);
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }
}

impl PlaceIndex for SledIndex {
    fn postcode(&self, key: &str) -> Result<Option<PlaceRecord>, IndexError> {
        match self.postcodes.get(key.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn cities_by_population(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<PlaceRecord>, IndexError> {
        Self::scan(&self.cities, key, limit)
    }

    fn postcodes_for_city(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<PlaceRecord>, IndexError> {
        Self::scan(&self.city_postcodes, key, limit)
    }
}
