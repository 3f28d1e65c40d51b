//! Rule-based grammar parser.
//!
//! Deterministic and fully offline: chunk the text on line breaks (or
//! commas for single-line input), take the first chunk as line1, then scan
//! from the end for a `<postcode> <city>` chunk, which is the common layout
//! across European addresses. Always succeeds; a `rules_no_parse` warning
//! marks inputs the grammar could not structure.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use super::{PipelineKind, Provider, ProviderError, ResolveRequest};

pub const WARN_NO_PARSE: &str = "rules_no_parse";

#[derive(Debug, Default)]
pub struct RuleParser;

impl RuleParser {
    pub fn new() -> Self {
        Self
    }

    fn parse(request: &ResolveRequest) -> Value {
        let raw = request.raw_address.as_str();
        let country = request.country_hint.trim().to_uppercase();

        let mut chunks: Vec<&str> = raw
            .split(['\n', '\r'])
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if chunks.len() <= 1 {
            chunks = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .collect();
        }

        let mut line1 = String::new();
        let mut line2 = String::new();
        let mut postcode = String::new();
        let mut city = String::new();

        if let Some(first) = chunks.first() {
            line1 = first.to_string();
        }

        let postcode_city = Regex::new(
            r"^(?P<postcode>[A-Za-z0-9][A-Za-z0-9\- ]{2,10})\s+(?P<city>.+)$",
        )
        .unwrap();

        for idx in (0..chunks.len()).rev() {
            let Some(caps) = postcode_city.captures(chunks[idx]) else {
                continue;
            };
            let pc = caps["postcode"].trim();
            // Short tokens are usually house numbers, and digit-free ones
            // street names; neither is a postcode.
            if pc.chars().filter(|c| !c.is_whitespace()).count() < 4
                || !pc.chars().any(|c| c.is_ascii_digit())
            {
                continue;
            }
            postcode = pc.to_string();
            city = caps["city"].trim().to_string();
            if idx > 1 {
                line2 = chunks[1..idx].join(", ");
            }
            break;
        }

        // No postcode+city chunk found; the last chunk is often a bare city.
        if city.is_empty() && chunks.len() >= 2 {
            city = chunks.last().unwrap().to_string();
        }

        let mut warnings: Vec<&str> = Vec::new();
        if chunks.is_empty() || (postcode.is_empty() && city.is_empty()) {
            warnings.push(WARN_NO_PARSE);
        }

        json!({
            "country_code": country,
            "address_line1": line1,
            "address_line2": line2,
            "postcode": postcode,
            "city": city,
            "state_region": "",
            "neighborhood": "",
            "po_box": "",
            "company": "",
            "attention": "",
            "raw_address": raw,
            "confidence": confidence(raw, &line1, &city, &postcode),
            "warnings": warnings,
        })
    }
}

/// Additive presence heuristic, capped below certainty.
fn confidence(raw: &str, line1: &str, city: &str, postcode: &str) -> f64 {
    if raw.trim().is_empty() {
        return 0.0;
    }
    let mut conf: f64 = 0.4;
    if !line1.is_empty() {
        conf += 0.25;
    }
    if !city.is_empty() {
        conf += 0.15;
    }
    if !postcode.is_empty() {
        conf += 0.15;
    }
    conf.min(0.95)
}

#[async_trait]
impl Provider for RuleParser {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Rules
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<Value, ProviderError> {
        Ok(Self::parse(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str, country: &str) -> Value {
        RuleParser::parse(&ResolveRequest {
            raw_address: raw.into(),
            country_hint: country.into(),
        })
    }

    #[test]
    fn test_multiline_eu_address() {
        let v = parse("Bahnhofstrasse 1\n8001 Zürich", "ch");

        assert_eq!(v["country_code"], "CH");
        assert_eq!(v["address_line1"], "Bahnhofstrasse 1");
        assert_eq!(v["postcode"], "8001");
        assert_eq!(v["city"], "Zürich");
        assert!(v["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_single_line_splits_on_commas() {
        let v = parse("10 Downing Street, SW1A 2AA London", "gb");

        assert_eq!(v["address_line1"], "10 Downing Street");
        assert_eq!(v["postcode"], "SW1A 2AA");
        assert_eq!(v["city"], "London");
    }

    #[test]
    fn test_middle_chunks_become_line2() {
        let v = parse("Acme GmbH, Postfach 12, 3rd floor, 8001 Zürich", "ch");

        assert_eq!(v["address_line1"], "Acme GmbH");
        assert_eq!(v["address_line2"], "Postfach 12, 3rd floor");
        assert_eq!(v["postcode"], "8001");
    }

    #[test]
    fn test_short_tokens_are_not_postcodes() {
        // "1 Bern" must not parse as postcode 1 / city Bern.
        let v = parse("Hauptgasse 1, Bern", "ch");

        assert_eq!(v["postcode"], "");
        assert_eq!(v["city"], "Bern");
    }

    #[test]
    fn test_unstructured_input_warns() {
        let v = parse("somewhere", "");
        let warnings = v["warnings"].as_array().unwrap();
        assert_eq!(warnings[0], WARN_NO_PARSE);

        let v = parse("", "");
        assert_eq!(v["confidence"], 0.0);
        assert_eq!(v["warnings"].as_array().unwrap()[0], WARN_NO_PARSE);
    }

    #[test]
    fn test_confidence_additive() {
        let v = parse("Bahnhofstrasse 1\n8001 Zürich", "ch");
        let conf = v["confidence"].as_f64().unwrap();
        assert!((conf - 0.95).abs() < 1e-9);

        let v = parse("somewhere", "");
        let conf = v["confidence"].as_f64().unwrap();
        assert!((conf - 0.65).abs() < 1e-9);
    }
}
