//! Canonical-schema coercion for raw provider output.
//!
//! Providers return arbitrary JSON objects. This module turns any of them
//! into a well-formed [`NormalizedAddress`] without ever failing: missing
//! and null fields become empty strings, non-strings are stringified,
//! confidence is clamped, warnings are flattened to a list of non-empty
//! trimmed codes.

use serde_json::Value;

use crate::models::NormalizedAddress;

/// Caller-supplied substitutes for fields the provider left empty.
#[derive(Debug, Clone, Default)]
pub struct Fallback {
    pub country_code: String,
    pub raw_address: String,
}

/// Coerce a raw provider object into the canonical record. Total: any JSON
/// value (object or not) produces a well-formed result.
pub fn normalize(raw: &Value, fallback: &Fallback) -> NormalizedAddress {
    let mut out = NormalizedAddress {
        country_code: string_field(raw, "country_code"),
        address_line1: string_field(raw, "address_line1"),
        address_line2: string_field(raw, "address_line2"),
        postcode: string_field(raw, "postcode"),
        city: string_field(raw, "city"),
        state_region: string_field(raw, "state_region"),
        neighborhood: string_field(raw, "neighborhood"),
        po_box: string_field(raw, "po_box"),
        company: string_field(raw, "company"),
        attention: string_field(raw, "attention"),
        raw_address: string_field(raw, "raw_address"),
        confidence: 0.0,
        warnings: Vec::new(),
    };

    if out.raw_address.is_empty() {
        out.raw_address = fallback.raw_address.clone();
    }

    if out.country_code.is_empty() {
        out.country_code = fallback.country_code.trim().to_string();
    }
    out.country_code = out.country_code.to_uppercase();

    out.confidence = clamp_confidence(raw.get("confidence"));
    out.warnings = coerce_warnings(raw.get("warnings"));

    out
}

fn string_field(raw: &Value, key: &str) -> String {
    raw.get(key).map(stringify).unwrap_or_default()
}

/// Render any JSON value as a trimmed string. Null becomes empty; arrays and
/// objects fall back to their compact JSON text.
fn stringify(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Parse confidence from a number or numeric string, collapse everything
/// else (including NaN/infinities) to 0.0, and clamp into `[0, 1]`.
fn clamp_confidence(v: Option<&Value>) -> f64 {
    let parsed = match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if !parsed.is_finite() {
        return 0.0;
    }
    parsed.clamp(0.0, 1.0)
}

/// Accept a list, a scalar, or nothing; yield trimmed non-empty codes.
fn coerce_warnings(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .map(stringify)
            .filter(|w| !w.is_empty())
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(scalar) => {
            let w = stringify(scalar);
            if w.is_empty() {
                Vec::new()
            } else {
                vec![w]
            }
        }
    }
}
