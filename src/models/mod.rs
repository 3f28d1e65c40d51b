//! Core data models for address resolution and geo-enrichment.

pub mod address;
pub mod place;

pub use address::{GeoAccuracy, GeoEnrichedAddress, NormalizedAddress};
pub use place::PlaceRecord;
