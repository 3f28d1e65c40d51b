//! Generative-model extractor.
//!
//! Sends a one-shot instruction prompt to a pluggable model client and
//! parses the reply. Models rarely return pure JSON, so the adapter locates
//! the first balanced `{...}` object in the text before parsing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{PipelineKind, Provider, ProviderError, ResolveRequest};

/// Raw model invocation; implementations live with the embedding
/// application (SDK clients, test fakes).
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

pub struct ModelExtractor {
    client: Arc<dyn ModelClient>,
}

impl ModelExtractor {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    fn prompt(request: &ResolveRequest) -> String {
        let country = if request.country_hint.trim().is_empty() {
            "(auto)".to_string()
        } else {
            request.country_hint.trim().to_uppercase()
        };
        format!(
            "Split the following postal address into its components. \
             Return ONLY a JSON object with the keys country_code, \
             address_line1, address_line2, postcode, city, state_region, \
             neighborhood, po_box, company, attention, raw_address, \
             confidence, warnings. Country: {}. Address: {}",
            country,
            request.raw_address.trim()
        )
    }
}

#[async_trait]
impl Provider for ModelExtractor {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Model
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<Value, ProviderError> {
        let text = self.client.complete(&Self::prompt(request)).await?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        extract_json(&text)
    }
}

/// Parse the first balanced JSON object out of model text.
///
/// Pure JSON passes straight through; otherwise a depth scan (aware of
/// string literals and escapes) finds the object boundary. Anything without
/// a balanced object, or whose object does not parse, is `OutputNotJson`.
pub fn extract_json(text: &str) -> Result<Value, ProviderError> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        if let Ok(v) = serde_json::from_str(trimmed) {
            return Ok(v);
        }
    }

    let candidate = first_balanced_object(trimmed).ok_or(ProviderError::OutputNotJson)?;
    serde_json::from_str(candidate).map_err(|_| ProviderError::OutputNotJson)
}

fn first_balanced_object(text: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if start.is_some() => in_string = true,
            '{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if start.is_some() => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start.unwrap()..i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeModel(String);

    #[async_trait]
    impl ModelClient for FakeModel {
        async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_extract_pure_json() {
        let v = extract_json(r#"{"city": "Bern", "confidence": 0.9}"#).unwrap();
        assert_eq!(v["city"], json!("Bern"));
    }

    #[test]
    fn test_extract_json_embedded_in_prose() {
        let text = r#"Sure! Here is the parsed address:

{"city": "Zürich", "note": "braces {inside strings} are fine"}

Let me know if you need anything else."#;
        let v = extract_json(text).unwrap();
        assert_eq!(v["city"], json!("Zürich"));
    }

    #[test]
    fn test_extract_takes_first_object() {
        let text = r#"{"city": "Bern"} trailing {"city": "Basel"}"#;
        let v = extract_json(text).unwrap();
        assert_eq!(v["city"], json!("Bern"));
    }

    #[test]
    fn test_extract_rejects_unbalanced() {
        assert!(matches!(
            extract_json("no json here at all"),
            Err(ProviderError::OutputNotJson)
        ));
        assert!(matches!(
            extract_json(r#"{"city": "Bern""#),
            Err(ProviderError::OutputNotJson)
        ));
    }

    #[tokio::test]
    async fn test_empty_response_fails() {
        let adapter = ModelExtractor::new(std::sync::Arc::new(FakeModel("  \n".into())));
        let err = adapter
            .resolve(&ResolveRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
        assert_eq!(err.warning_code(), "empty_response");
    }

    #[tokio::test]
    async fn test_resolve_parses_model_reply() {
        let adapter = ModelExtractor::new(std::sync::Arc::new(FakeModel(
            r#"The components are: {"postcode": "8001", "city": "Zürich"}"#.into(),
        )));
        let v = adapter
            .resolve(&ResolveRequest {
                raw_address: "Bahnhofstrasse 1, 8001 Zürich".into(),
                country_hint: "ch".into(),
            })
            .await
            .unwrap();
        assert_eq!(v["postcode"], json!("8001"));
    }
}
