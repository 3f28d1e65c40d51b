//! Tiered offline geo-resolution.
//!
//! Three lookups (postcode-exact, population-ranked city, city-to-postcode
//! with nearest-centroid disambiguation) and the orchestrator that sequences
//! them per address record.

mod enrich;
mod lookup;

use std::sync::Arc;

use crate::index::PlaceIndex;

/// Resolves coordinates for normalized addresses from the offline index.
///
/// Holds only read-only collaborators; safe to share across concurrent
/// pipelines.
#[derive(Clone)]
pub struct OfflineGeoResolver {
    index: Arc<dyn PlaceIndex>,
    city_candidate_limit: usize,
}

impl OfflineGeoResolver {
    pub fn new(index: Arc<dyn PlaceIndex>, city_candidate_limit: usize) -> Self {
        Self {
            index,
            city_candidate_limit: city_candidate_limit.max(1),
        }
    }

    pub(crate) fn index(&self) -> &dyn PlaceIndex {
        self.index.as_ref()
    }

    pub(crate) fn city_candidate_limit(&self) -> usize {
        self.city_candidate_limit
    }
}
