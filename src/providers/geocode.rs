//! Managed geocoding API adapter.
//!
//! The upstream place-search SDK is pluggable; this adapter flattens its
//! response into the canonical component map and grades the accuracy:
//! `street` when the hit carries a street or house number, `city`
//! otherwise. An empty result set is not a failure, it yields a record with
//! accuracy `none` and a `no_location_match` warning.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{PipelineKind, Provider, ProviderError, ResolveRequest};

pub const WARN_NO_LOCATION_MATCH: &str = "no_location_match";

/// Raw place-search call; returns the provider-shaped payload
/// (`{"Results": [{"Place": {...}}]}`).
#[async_trait]
pub trait GeocodeClient: Send + Sync {
    async fn search(&self, text: &str, country: &str) -> Result<Value, ProviderError>;
}

pub struct GeocodeAdapter {
    client: Arc<dyn GeocodeClient>,
}

impl GeocodeAdapter {
    pub fn new(client: Arc<dyn GeocodeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for GeocodeAdapter {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Geocode
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<Value, ProviderError> {
        let payload = self
            .client
            .search(&request.raw_address, &request.country_hint)
            .await?;

        let results = payload["Results"].as_array().cloned().unwrap_or_default();
        let Some(place) = results.first().map(|r| r["Place"].clone()) else {
            return Ok(json!({
                "geo_accuracy": "none",
                "warnings": [WARN_NO_LOCATION_MATCH],
            }));
        };

        // Point is [lon, lat].
        let point = place["Geometry"]["Point"].as_array().cloned().unwrap_or_default();
        let lon = point.first().and_then(Value::as_f64);
        let lat = point.get(1).and_then(Value::as_f64);

        let label = str_field(&place, "Label");
        let postcode = str_field(&place, "PostalCode");
        let city = str_field(&place, "Municipality");
        let state_region = str_field(&place, "Region");
        let mut country_code = str_field(&place, "Country");
        if country_code.is_empty() {
            country_code = request.country_hint.trim().to_uppercase();
        }

        let has_street =
            !str_field(&place, "Street").is_empty() || !str_field(&place, "AddressNumber").is_empty();
        let (geo_accuracy, confidence) = if has_street {
            ("street", 0.9)
        } else {
            ("city", 0.7)
        };

        Ok(json!({
            "latitude": lat,
            "longitude": lon,
            "geo_accuracy": geo_accuracy,
            "geonames_match": "",
            "address_line1": label,
            "address_line2": "",
            "postcode": postcode,
            "city": city,
            "state_region": state_region,
            "country_code": country_code,
            "raw_address": request.raw_address,
            "confidence": confidence,
            "warnings": [],
        }))
    }
}

fn str_field(v: &Value, key: &str) -> String {
    v[key].as_str().unwrap_or_default().trim().to_string()
}
