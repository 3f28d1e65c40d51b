//! The three offline lookups behind enrichment.

use tracing::debug;

use crate::geo::distance_km;
use crate::index::{composite_key, IndexError};
use crate::models::PlaceRecord;
use crate::normalize::normalize_key;

use super::OfflineGeoResolver;

impl OfflineGeoResolver {
    /// Exact postcode centroid lookup under `CC#POSTCODE`. `None` when
    /// either input is empty or the key misses.
    pub fn by_postcode(
        &self,
        country: &str,
        postcode: &str,
    ) -> Result<Option<PlaceRecord>, IndexError> {
        let country = country.trim();
        let postcode = postcode.trim();
        if country.is_empty() || postcode.is_empty() {
            return Ok(None);
        }

        self.index().postcode(&composite_key(country, postcode))
    }

    /// Highest-population city matching the normalized name key, with a
    /// one-shot retry on the plain lowercase-trimmed key for index entries
    /// that predate key normalization.
    pub fn by_city_best(
        &self,
        country: &str,
        city: &str,
    ) -> Result<Option<PlaceRecord>, IndexError> {
        let country = country.trim();
        if country.is_empty() || city.trim().is_empty() {
            return Ok(None);
        }

        let mut rows = Vec::new();
        for key_part in candidate_keys(city) {
            rows = self
                .index()
                .cities_by_population(&composite_key(country, &key_part), 1)?;
            if !rows.is_empty() {
                break;
            }
            debug!(country, key = %key_part, "city-best miss");
        }

        Ok(rows.into_iter().next())
    }

    /// Recover a postcode for a city, disambiguating multiple candidates by
    /// great-circle distance to `reference` when one is supplied.
    pub fn postcode_for_city(
        &self,
        country: &str,
        city: &str,
        reference: Option<(f64, f64)>,
    ) -> Result<Option<PlaceRecord>, IndexError> {
        let country = country.trim();
        if country.is_empty() || city.trim().is_empty() {
            return Ok(None);
        }

        let mut candidates = Vec::new();
        for key_part in candidate_keys(city) {
            candidates = self.index().postcodes_for_city(
                &composite_key(country, &key_part),
                self.city_candidate_limit(),
            )?;
            if !candidates.is_empty() {
                break;
            }
        }

        if candidates.len() <= 1 {
            return Ok(candidates.into_iter().next());
        }

        let (ref_lat, ref_lon) = match reference {
            Some(point) => point,
            // Without an anchor, the index's natural (ascending postcode)
            // order decides.
            None => return Ok(candidates.into_iter().next()),
        };

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            let Some((lat, lon)) = candidate.centroid() else {
                continue;
            };
            let d = distance_km(ref_lat, ref_lon, lat, lon);
            if !d.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }

        let chosen = best.map(|(i, _)| i).unwrap_or(0);
        Ok(Some(candidates.swap_remove(chosen)))
    }
}

/// Key variants to try, in order: the normalized key, then the plain
/// lowercase-trim when it differs. Empty variants are skipped.
fn candidate_keys(city: &str) -> Vec<String> {
    let normalized = normalize_key(city);
    let plain = city.trim().to_lowercase();

    let mut keys = Vec::new();
    if !normalized.is_empty() {
        keys.push(normalized.clone());
    }
    if !plain.is_empty() && plain != normalized {
        keys.push(plain);
    }
    keys
}
