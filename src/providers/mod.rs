//! Provider adapters: one per extraction source.
//!
//! Each adapter is an independently failing capability behind the same
//! small trait. The raw upstream calls (model invocation, place-search SDK,
//! capture HTTP API) sit behind pluggable client traits; the adapters own
//! the shape mapping and the failure taxonomy.

pub mod capture;
pub mod geocode;
pub mod model;
pub mod rules;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use capture::{CaptureAdapter, CaptureClient, HttpCaptureClient};
pub use geocode::{GeocodeAdapter, GeocodeClient};
pub use model::{ModelClient, ModelExtractor};
pub use rules::RuleParser;

/// Identifies one provider-to-record path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Model,
    Rules,
    Geocode,
    Capture,
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineKind::Model => write!(f, "model"),
            PipelineKind::Rules => write!(f, "rules"),
            PipelineKind::Geocode => write!(f, "geocode"),
            PipelineKind::Capture => write!(f, "capture"),
        }
    }
}

/// One address resolution request, shared by every pipeline.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub raw_address: String,
    /// Optional ISO-2 country hint; empty when the caller has none.
    pub country_hint: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider returned no text")]
    EmptyResponse,

    #[error("model output is not JSON")]
    OutputNotJson,

    #[error("no capture candidates for input")]
    NoCandidates,

    #[error("capture candidate has no id")]
    MissingId,

    #[error("capture retrieve returned no rows")]
    RetrieveEmpty,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid provider payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Stable warning code recorded on the failed pipeline's record.
    pub fn warning_code(&self) -> &'static str {
        match self {
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::OutputNotJson => "model_output_not_json",
            ProviderError::NoCandidates => "capture_no_candidates",
            ProviderError::MissingId => "capture_missing_id",
            ProviderError::RetrieveEmpty => "capture_retrieve_empty",
            ProviderError::Http(_) => "adapter_http_error",
            ProviderError::InvalidJson(_) => "adapter_invalid_json",
            ProviderError::Other(_) => "adapter_failed",
        }
    }
}

/// An extraction source. Returns a provider-shaped JSON object; the schema
/// normalizer downstream is total over whatever comes back.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> PipelineKind;

    async fn resolve(&self, request: &ResolveRequest) -> Result<Value, ProviderError>;
}
