//! Capture API adapter: find-then-retrieve.
//!
//! The find call turns free text into ranked candidates; retrieve expands
//! the best candidate into full components. The two steps fail distinctly
//! (`NoCandidates`, `MissingId`, `RetrieveEmpty`) so the pipeline records
//! tell apart where the lookup died.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use super::{PipelineKind, Provider, ProviderError, ResolveRequest};

const FIND_PATH: &str = "Capture/Interactive/Find/v1.10/json3.ws";
const RETRIEVE_PATH: &str = "Capture/Interactive/Retrieve/v1.00/json3.ws";

/// Raw capture API calls; both return the provider's `{"Items": [...]}`
/// payload.
#[async_trait]
pub trait CaptureClient: Send + Sync {
    async fn find(&self, text: &str, limit: usize, language: &str) -> Result<Value, ProviderError>;

    async fn retrieve(&self, id: &str) -> Result<Value, ProviderError>;
}

/// HTTP client for the hosted capture service.
pub struct HttpCaptureClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpCaptureClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn get_json(&self, url: Url) -> Result<Value, ProviderError> {
        let response = self.http.get(url).send().await?;
        Ok(response.json().await?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| ProviderError::Other(format!("bad capture endpoint: {e}")))
    }
}

#[async_trait]
impl CaptureClient for HttpCaptureClient {
    async fn find(&self, text: &str, limit: usize, language: &str) -> Result<Value, ProviderError> {
        let mut url = self.endpoint(FIND_PATH)?;
        url.query_pairs_mut()
            .append_pair("Key", &self.api_key)
            .append_pair("Text", text)
            .append_pair("Limit", &limit.clamp(1, 10).to_string());
        if !language.is_empty() {
            url.query_pairs_mut().append_pair("Language", language);
        }
        self.get_json(url).await
    }

    async fn retrieve(&self, id: &str) -> Result<Value, ProviderError> {
        let mut url = self.endpoint(RETRIEVE_PATH)?;
        url.query_pairs_mut()
            .append_pair("Key", &self.api_key)
            .append_pair("Id", id);
        self.get_json(url).await
    }
}

pub struct CaptureAdapter {
    client: Arc<dyn CaptureClient>,
    limit: usize,
    language: String,
}

impl CaptureAdapter {
    pub fn new(client: Arc<dyn CaptureClient>, limit: usize, language: &str) -> Self {
        Self {
            client,
            limit,
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl Provider for CaptureAdapter {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Capture
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<Value, ProviderError> {
        let text = request.raw_address.trim();
        if text.is_empty() {
            return Err(ProviderError::Other("missing raw address".into()));
        }

        let found = self.client.find(text, self.limit, &self.language).await?;
        let items = found["Items"].as_array().cloned().unwrap_or_default();
        let Some(best) = items.first() else {
            return Err(ProviderError::NoCandidates);
        };

        let id = best["Id"].as_str().unwrap_or_default().trim().to_string();
        if id.is_empty() {
            return Err(ProviderError::MissingId);
        }

        let retrieved = self.client.retrieve(&id).await?;
        let rows = retrieved["Items"].as_array().cloned().unwrap_or_default();
        let Some(row) = rows.first() else {
            return Err(ProviderError::RetrieveEmpty);
        };

        Ok(map_components(row, request))
    }
}

/// Component keys vary by country; try the common spellings in order and
/// fold overflow lines into line2 when it is empty.
fn map_components(row: &Value, request: &ResolveRequest) -> Value {
    let mut country_code = first_str(row, &["CountryIso2", "CountryISO2", "Country"]);
    if country_code.is_empty() {
        country_code = request.country_hint.trim().to_string();
    }

    let line1 = first_str(row, &["Line1"]);
    let mut line2 = first_str(row, &["Line2"]);
    if line2.is_empty() {
        let extras: Vec<String> = ["Line3", "Line4", "Line5"]
            .into_iter()
            .map(|k| first_str(row, &[k]))
            .filter(|s| !s.is_empty())
            .collect();
        if !extras.is_empty() {
            line2 = extras.join(", ");
        }
    }

    let city = first_str(row, &["City", "Locality"]);
    let state_region = first_str(row, &["Province", "State", "AdministrativeArea"]);
    let postcode = first_str(row, &["PostalCode", "Postcode"]);

    // The provider exposes no calibrated score; success with real
    // components is treated as high confidence.
    let confidence = if !line1.is_empty() || !city.is_empty() || !postcode.is_empty() {
        0.9
    } else {
        0.6
    };

    json!({
        "country_code": country_code.to_uppercase(),
        "address_line1": line1,
        "address_line2": line2,
        "postcode": postcode,
        "city": city,
        "state_region": state_region,
        "neighborhood": "",
        "po_box": "",
        "company": "",
        "attention": "",
        "raw_address": request.raw_address,
        "confidence": confidence,
        "warnings": [],
    })
}

fn first_str(v: &Value, keys: &[&str]) -> String {
    for key in keys {
        if let Some(s) = v[*key].as_str() {
            let s = s.trim();
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCapture {
        find: Value,
        retrieve: Value,
    }

    #[async_trait]
    impl CaptureClient for FakeCapture {
        async fn find(
            &self,
            _text: &str,
            _limit: usize,
            _language: &str,
        ) -> Result<Value, ProviderError> {
            Ok(self.find.clone())
        }

        async fn retrieve(&self, _id: &str) -> Result<Value, ProviderError> {
            Ok(self.retrieve.clone())
        }
    }

    fn adapter(find: Value, retrieve: Value) -> CaptureAdapter {
        CaptureAdapter::new(Arc::new(FakeCapture { find, retrieve }), 5, "")
    }

    fn request() -> ResolveRequest {
        ResolveRequest {
            raw_address: "10 Downing Street, London".into(),
            country_hint: "gb".into(),
        }
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let err = adapter(json!({"Items": []}), json!({}))
            .resolve(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoCandidates));
        assert_eq!(err.warning_code(), "capture_no_candidates");
    }

    #[tokio::test]
    async fn test_missing_id() {
        let err = adapter(json!({"Items": [{"Text": "partial"}]}), json!({}))
            .resolve(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingId));
    }

    #[tokio::test]
    async fn test_retrieve_empty() {
        let err = adapter(json!({"Items": [{"Id": "abc"}]}), json!({"Items": []}))
            .resolve(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RetrieveEmpty));
    }

    #[tokio::test]
    async fn test_component_mapping_and_line_folding() {
        let retrieve = json!({"Items": [{
            "CountryIso2": "gb",
            "Line1": "10 Downing Street",
            "Line3": "Westminster",
            "Line4": "Whitehall",
            "City": "London",
            "Province": "Greater London",
            "PostalCode": "SW1A 2AA"
        }]});

        let v = adapter(json!({"Items": [{"Id": "abc"}]}), retrieve)
            .resolve(&request())
            .await
            .unwrap();

        assert_eq!(v["country_code"], "GB");
        assert_eq!(v["address_line1"], "10 Downing Street");
        assert_eq!(v["address_line2"], "Westminster, Whitehall");
        assert_eq!(v["postcode"], "SW1A 2AA");
        assert_eq!(v["confidence"], json!(0.9));
    }

    #[tokio::test]
    async fn test_bare_row_gets_low_confidence_and_hint_country() {
        let v = adapter(json!({"Items": [{"Id": "abc"}]}), json!({"Items": [{}]}))
            .resolve(&request())
            .await
            .unwrap();

        assert_eq!(v["country_code"], "GB");
        assert_eq!(v["confidence"], json!(0.6));
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let err = adapter(json!({}), json!({}))
            .resolve(&ResolveRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Other(_)));
    }
}
