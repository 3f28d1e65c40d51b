//! Per-address pipeline fan-out.
//!
//! Each configured provider runs as an independent concurrent task under a
//! shared deadline. A failing or timed-out adapter is captured as data on
//! its own record (warning codes, zero confidence) and never disturbs a
//! sibling pipeline. Records that come back without native coordinates go
//! through the offline enrichment pass.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::models::{GeoAccuracy, GeoEnrichedAddress, NormalizedAddress};
use crate::normalize::{normalize, Fallback};
use crate::providers::{PipelineKind, Provider, ResolveRequest};
use crate::resolve::OfflineGeoResolver;

pub const WARN_ADAPTER_TIMEOUT: &str = "adapter_timeout";
pub const WARN_GEO_LOOKUP_FAILED: &str = "geo_lookup_failed";

/// One pipeline's final record.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub pipeline: PipelineKind,
    pub result: GeoEnrichedAddress,
}

/// Fans one request out to every configured provider.
pub struct ResolutionService {
    providers: Vec<Arc<dyn Provider>>,
    resolver: OfflineGeoResolver,
    adapter_timeout: Duration,
}

impl ResolutionService {
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        resolver: OfflineGeoResolver,
        adapter_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            resolver,
            adapter_timeout,
        }
    }

    /// Resolve one address through every pipeline. Always returns exactly
    /// one record per configured provider, in configuration order.
    pub async fn resolve(&self, request: &ResolveRequest) -> Vec<PipelineResult> {
        let tasks = self
            .providers
            .iter()
            .map(|provider| self.run_pipeline(provider.as_ref(), request));
        join_all(tasks).await
    }

    async fn run_pipeline(
        &self,
        provider: &dyn Provider,
        request: &ResolveRequest,
    ) -> PipelineResult {
        let kind = provider.kind();

        let raw = match timeout(self.adapter_timeout, provider.resolve(request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(pipeline = %kind, error = %e, "adapter failed");
                return PipelineResult {
                    pipeline: kind,
                    result: failure_record(request, e.warning_code(), &e.to_string()),
                };
            }
            Err(_) => {
                warn!(pipeline = %kind, timeout = ?self.adapter_timeout, "adapter timed out");
                return PipelineResult {
                    pipeline: kind,
                    result: failure_record(
                        request,
                        WARN_ADAPTER_TIMEOUT,
                        "adapter call exceeded its deadline",
                    ),
                };
            }
        };

        let fallback = Fallback {
            country_code: request.country_hint.clone(),
            raw_address: request.raw_address.clone(),
        };
        let mut rec = attach_native_geo(normalize(&raw, &fallback), &raw);

        if !rec.has_coordinates() {
            if let Err(e) = self.resolver.enrich_record(&mut rec) {
                warn!(pipeline = %kind, error = %e, "offline enrichment failed");
                rec.address.warnings.push(WARN_GEO_LOOKUP_FAILED.to_string());
            }
        }

        debug!(pipeline = %kind, accuracy = %rec.geo_accuracy, "pipeline finished");
        PipelineResult {
            pipeline: kind,
            result: rec,
        }
    }
}

/// Build the zero-confidence record for a failed pipeline.
fn failure_record(request: &ResolveRequest, code: &str, message: &str) -> GeoEnrichedAddress {
    let mut warnings = vec![code.to_string()];
    let message = message.trim();
    if !message.is_empty() && message != code {
        warnings.push(message.to_string());
    }

    GeoEnrichedAddress::new(NormalizedAddress {
        country_code: request.country_hint.trim().to_uppercase(),
        raw_address: request.raw_address.clone(),
        confidence: 0.0,
        warnings,
        ..Default::default()
    })
}

/// Lift native coordinates out of a provider map, when it carried any.
/// A coordinate without a stated accuracy is graded `city`, keeping the
/// present-coordinate-implies-tier invariant.
fn attach_native_geo(addr: NormalizedAddress, raw: &Value) -> GeoEnrichedAddress {
    let mut rec = GeoEnrichedAddress::new(addr);

    let (Some(lat), Some(lon)) = (num_field(raw, "latitude"), num_field(raw, "longitude")) else {
        return rec;
    };

    let stated = GeoAccuracy::parse(raw["geo_accuracy"].as_str().unwrap_or_default());
    let tier = if stated == GeoAccuracy::None {
        GeoAccuracy::City
    } else {
        stated
    };
    rec.upgrade(lat, lon, tier);
    rec
}

fn num_field(raw: &Value, key: &str) -> Option<f64> {
    let parsed = match &raw[key] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
