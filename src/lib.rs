//! Magnolia - free-text postal address resolution with offline geo-enrichment.
//!
//! Runs an address through independent provider pipelines, coerces every
//! provider's output into one canonical schema, and resolves coordinates
//! from an offline place index using a tiered postcode/city fallback.

pub mod config;
pub mod geo;
pub mod index;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod resolve;

pub use models::{GeoAccuracy, GeoEnrichedAddress, NormalizedAddress, PlaceRecord};
pub use pipeline::{PipelineResult, ResolutionService};
pub use resolve::OfflineGeoResolver;
