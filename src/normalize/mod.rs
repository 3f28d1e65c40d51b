//! Normalizers: the place-name join key and the canonical-schema coercion.

pub mod key;
pub mod schema;

pub use key::normalize_key;
pub use schema::{normalize, Fallback};
